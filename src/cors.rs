use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Method, Status};
use rocket::{Request, Response};

use std::io::Cursor;

pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    pub fn new(allowed_origins: Vec<String>) -> Cors {
        Cors { allowed_origins }
    }

    /// The value for `Access-Control-Allow-Origin`, if the origin is allowed.
    /// A wildcard echoes the caller's origin so credentials stay usable.
    fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        let wildcard = self.allowed_origins.iter().any(|o| o == "*");

        match origin {
            Some(origin) if wildcard || self.allowed_origins.iter().any(|o| o == origin) => {
                Some(origin.to_string())
            }
            None if wildcard => Some("*".to_string()),
            _ => None,
        }
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let allowed = match self.allow_origin(request.headers().get_one("Origin")) {
            Some(allowed) => allowed,
            None => return,
        };

        response.set_header(Header::new("Access-Control-Allow-Origin", allowed));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        response.set_header(Header::new(
            "Access-Control-Allow-Headers",
            "Content-Type, Authorization, X-User-Id",
        ));
        response.set_header(Header::new("Vary", "Origin"));

        // preflight requests never match a route
        if request.method() == Method::Options && response.status() == Status::NotFound {
            response.set_status(Status::NoContent);
            response.set_sized_body(0, Cursor::new(""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_echoes_origin() {
        let cors = Cors::new(vec!["*".to_string()]);
        assert_eq!(
            cors.allow_origin(Some("https://app.example.com")),
            Some("https://app.example.com".to_string())
        );
        assert_eq!(cors.allow_origin(None), Some("*".to_string()));
    }

    #[test]
    fn listed_origins_only() {
        let cors = Cors::new(vec!["https://app.example.com".to_string()]);
        assert!(cors.allow_origin(Some("https://app.example.com")).is_some());
        assert_eq!(cors.allow_origin(Some("https://evil.example.com")), None);
        assert_eq!(cors.allow_origin(None), None);
    }
}
