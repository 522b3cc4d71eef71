use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};

use super::data::*;
use crate::internal_error::{AppResult, InternalResult};

const MAX_LISTED_FAVORITES: usize = 100;

fn get_favorite_from_row(row: &Row) -> rusqlite::Result<FavoriteQuote> {
    Ok(FavoriteQuote {
        id: row.get(0)?,
        user_id: row.get(1)?,
        quote: row.get(2)?,
        author: row.get(3)?,
        saved_at: row.get(4)?,
    })
}

pub fn get_favorites_from_db(
    user_id: &str,
    db_connection: &Connection,
) -> InternalResult<Vec<FavoriteQuote>> {
    let mut statement = db_connection.prepare(
        "SELECT id, user_id, quote, author, saved_at FROM quote_favorites \
         WHERE user_id = (?1) ORDER BY rowid LIMIT (?2)",
    )?;

    let favorites = statement
        .query_map(
            params![user_id, MAX_LISTED_FAVORITES as i64],
            get_favorite_from_row,
        )?
        .collect::<rusqlite::Result<Vec<FavoriteQuote>>>()?;

    Ok(favorites)
}

pub fn add_favorite_to_db(
    user_id: &str,
    request: SaveFavoriteRequest,
    now: DateTime<Utc>,
    db_connection: &Connection,
) -> AppResult<FavoriteQuote> {
    request.validate()?;

    let favorite = FavoriteQuote {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        quote: request.quote,
        author: request.author,
        saved_at: now,
    };

    db_connection.execute(
        "INSERT INTO quote_favorites (id, user_id, quote, author, saved_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            favorite.id,
            favorite.user_id,
            favorite.quote,
            favorite.author,
            favorite.saved_at,
        ],
    )?;

    Ok(favorite)
}

pub fn delete_favorite_from_db(
    quote_id: &str,
    user_id: &str,
    db_connection: &Connection,
) -> InternalResult<bool> {
    let deleted = db_connection.execute(
        "DELETE FROM quote_favorites WHERE id = (?1) AND user_id = (?2)",
        params![quote_id, user_id],
    )?;

    Ok(deleted > 0)
}

/// Removes a single matching favorite, the oldest if saved more than once.
pub fn delete_favorite_by_content_from_db(
    quote: &str,
    author: &str,
    user_id: &str,
    db_connection: &Connection,
) -> InternalResult<bool> {
    let deleted = db_connection.execute(
        "DELETE FROM quote_favorites WHERE rowid = ( \
         SELECT rowid FROM quote_favorites \
         WHERE user_id = (?1) AND quote = (?2) AND author = (?3) ORDER BY rowid LIMIT 1)",
        params![user_id, quote, author],
    )?;

    Ok(deleted > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_connection;
    use crate::users::helpers::register_test_user;

    fn save(user_id: &str, quote: &str, connection: &Connection) -> FavoriteQuote {
        add_favorite_to_db(
            user_id,
            SaveFavoriteRequest {
                quote: quote.to_string(),
                author: "Seneca".to_string(),
            },
            Utc::now(),
            connection,
        )
        .unwrap()
    }

    #[test]
    fn favorites_belong_to_their_owner() {
        let connection = test_connection();
        let ana = register_test_user("ana", &connection);
        let bea = register_test_user("bea", &connection);

        let saved = save(&ana.id, "Luck is what happens when preparation meets opportunity.", &connection);

        assert_eq!(get_favorites_from_db(&ana.id, &connection).unwrap(), vec![saved.clone()]);
        assert!(get_favorites_from_db(&bea.id, &connection).unwrap().is_empty());
        assert!(!delete_favorite_from_db(&saved.id, &bea.id, &connection).unwrap());
        assert!(delete_favorite_from_db(&saved.id, &ana.id, &connection).unwrap());
        assert!(!delete_favorite_from_db(&saved.id, &ana.id, &connection).unwrap());
    }

    #[test]
    fn delete_by_content_removes_one_copy() {
        let connection = test_connection();
        let ana = register_test_user("ana", &connection);
        save(&ana.id, "We suffer more in imagination than in reality.", &connection);
        save(&ana.id, "We suffer more in imagination than in reality.", &connection);

        let quote = "We suffer more in imagination than in reality.";
        assert!(delete_favorite_by_content_from_db(quote, "Seneca", &ana.id, &connection).unwrap());
        assert_eq!(get_favorites_from_db(&ana.id, &connection).unwrap().len(), 1);
        assert!(!delete_favorite_by_content_from_db(quote, "Epictetus", &ana.id, &connection).unwrap());
    }

    #[test]
    fn empty_quote_is_rejected() {
        let connection = test_connection();
        let ana = register_test_user("ana", &connection);

        let result = add_favorite_to_db(
            &ana.id,
            SaveFavoriteRequest {
                quote: "  ".to_string(),
                author: "Nobody".to_string(),
            },
            Utc::now(),
            &connection,
        );
        assert!(result.is_err());
    }
}
