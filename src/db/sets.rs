//! Flashcard set storage: the card store the study engine loads from.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{generate_id, Card, FlashcardSet, SetSummary};

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Give id-less cards a fresh id and drop later duplicates of an id
fn normalize_cards(cards: &[Card]) -> Vec<Card> {
    let mut out: Vec<Card> = Vec::with_capacity(cards.len());
    for card in cards {
        let mut card = card.clone();
        if card.id.trim().is_empty() {
            card.id = generate_id();
        }
        if out.iter().any(|c| c.id == card.id) {
            continue;
        }
        out.push(card);
    }
    out
}

fn insert_cards(conn: &Connection, set_id: &str, cards: &[Card]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO cards (set_id, id, position, question, answer) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (position, card) in cards.iter().enumerate() {
        stmt.execute(params![set_id, card.id, position as i64, card.question, card.answer])?;
    }
    Ok(())
}

pub fn create_set(conn: &Connection, name: &str, cards: &[Card]) -> Result<FlashcardSet> {
    let set = FlashcardSet {
        id: generate_id(),
        name: name.to_string(),
        created_at: Utc::now(),
        cards: normalize_cards(cards),
    };

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO sets (id, name, created_at) VALUES (?1, ?2, ?3)",
        params![set.id, set.name, set.created_at.to_rfc3339()],
    )?;
    insert_cards(&tx, &set.id, &set.cards)?;
    tx.commit()?;

    tracing::info!("Created set {} with {} cards", set.id, set.cards.len());
    Ok(set)
}

/// Load a set with its cards in order
pub fn get_set(conn: &Connection, id: &str) -> Result<Option<FlashcardSet>> {
    let header = conn
        .query_row(
            "SELECT id, name, created_at FROM sets WHERE id = ?1",
            params![id],
            |row| {
                let created_at: String = row.get(2)?;
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?, created_at))
            },
        )
        .optional()?;

    let Some((id, name, created_at)) = header else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        r#"
    SELECT id, question, answer
    FROM cards
    WHERE set_id = ?1
    ORDER BY position ASC
    "#,
    )?;
    let cards = stmt
        .query_map(params![id], |row| {
            Ok(Card {
                id: row.get(0)?,
                question: row.get(1)?,
                answer: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(Some(FlashcardSet {
        id,
        name,
        created_at: parse_timestamp(&created_at),
        cards,
    }))
}

pub fn list_sets(conn: &Connection) -> Result<Vec<SetSummary>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT s.id, s.name, s.created_at, COUNT(c.id)
    FROM sets s
    LEFT JOIN cards c ON c.set_id = s.id
    GROUP BY s.id
    ORDER BY s.created_at DESC, s.name ASC
    "#,
    )?;
    let sets = stmt
        .query_map([], |row| {
            let created_at: String = row.get(2)?;
            Ok(SetSummary {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_timestamp(&created_at),
                card_count: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(sets)
}

/// Rewrite a set's cards in the given order. Returns the stored set, or `None`
/// if the set does not exist.
pub fn replace_cards(conn: &Connection, set_id: &str, cards: &[Card]) -> Result<Option<FlashcardSet>> {
    let cards = normalize_cards(cards);
    let tx = conn.unchecked_transaction()?;
    let updated = tx.execute(
        "UPDATE sets SET updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), set_id],
    )?;
    if updated == 0 {
        return Ok(None);
    }
    tx.execute("DELETE FROM cards WHERE set_id = ?1", params![set_id])?;
    insert_cards(&tx, set_id, &cards)?;
    tx.commit()?;

    tracing::debug!("Replaced cards of set {} ({} cards)", set_id, cards.len());
    get_set(conn, set_id)
}

/// Delete a set and its cards. Returns false if it did not exist.
pub fn delete_set(conn: &Connection, set_id: &str) -> Result<bool> {
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM cards WHERE set_id = ?1", params![set_id])?;
    let deleted = tx.execute("DELETE FROM sets WHERE id = ?1", params![set_id])?;
    tx.commit()?;
    Ok(deleted > 0)
}
