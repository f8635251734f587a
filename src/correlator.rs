//! Conversation transcripts.
//!
//! Joins the message store's conversation, membership, message, handle and
//! attachment tables into one table per conversation, with senders named
//! from the [`PhoneIndex`]. Conversations are processed one at a time in
//! `ROWID` order; the first failed query aborts the pass, leaving the
//! transcripts already written on disk.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, Utc};
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::config::CorrelationConfig;
use crate::error::{ExtractError, Result};
use crate::file_writer::{table_path, write_table};
use crate::identity::PhoneIndex;
use crate::metrics::MetricsCollector;
use crate::models::{Attachment, MessageRecord, OutputFormat, TranscriptRow};
use crate::schema::{attachment, chat, chat_message_join, handle, message, message_attachment_join};
use crate::validation::InputValidator;

/// Seconds between the Unix epoch and 2001-01-01T00:00:00
pub const APPLE_EPOCH_OFFSET: i64 = 978_307_200;

/// Raw dates at or beyond this magnitude are nanoseconds, not seconds
const NANOSECOND_THRESHOLD: u64 = 1_000_000_000_000;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whole seconds since 2001-01-01 for a raw `message.date`
///
/// Older stores count seconds, newer ones nanoseconds.
#[must_use]
pub const fn apple_seconds(raw: i64) -> i64 {
    if raw.unsigned_abs() >= NANOSECOND_THRESHOLD {
        raw / 1_000_000_000
    } else {
        raw
    }
}

/// Calendar string for a raw `message.date`
///
/// With `local` unset the reference clock is used as-is, so `0` renders as
/// `2001-01-01 00:00:00`. Returns `None` if the value is out of range.
#[must_use]
pub fn apple_timestamp(raw: i64, local: bool) -> Option<String> {
    let unix = apple_seconds(raw).checked_add(APPLE_EPOCH_OFFSET)?;
    let utc = DateTime::<Utc>::from_timestamp(unix, 0)?;

    let formatted = if local {
        utc.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string()
    } else {
        utc.naive_utc().format(TIMESTAMP_FORMAT).to_string()
    };
    Some(formatted)
}

/// Settings for one correlation pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelationOptions {
    /// Message IDs per `IN (...)` query
    pub batch_size: usize,
    /// Render dates in the local timezone
    pub local_time: bool,
    /// First name for messages sent by the device owner
    pub self_label: String,
    /// Transcript format
    pub format: OutputFormat,
}

impl Default for CorrelationOptions {
    fn default() -> Self {
        Self {
            batch_size: 500,
            local_time: false,
            self_label: "Me".to_string(),
            format: OutputFormat::Csv,
        }
    }
}

impl CorrelationOptions {
    /// Options from the `correlation` config section
    #[must_use]
    pub fn from_config(config: &CorrelationConfig, format: OutputFormat) -> Self {
        Self {
            batch_size: config.batch_size,
            local_time: config.local_time,
            self_label: config.self_label.clone(),
            format,
        }
    }
}

/// One correlated conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// `chat.ROWID`
    pub conversation_id: i64,
    /// Rows in message order
    pub rows: Vec<TranscriptRow>,
    /// Messages from someone else whose handle had no contact entry
    pub unresolved: usize,
}

impl Transcript {
    /// Output file stem, `message_id_<conversation>`
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!("message_id_{}", self.conversation_id)
    }
}

/// Totals of a finished pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationSummary {
    /// Transcripts written, in conversation order
    pub written: Vec<PathBuf>,
    /// Messages across all transcripts
    pub messages: usize,
    /// Unresolved senders across all transcripts
    pub unresolved: usize,
}

/// Builds transcripts from an open message store
pub struct ConversationCorrelator<'a> {
    conn: &'a Connection,
    index: &'a PhoneIndex,
    options: CorrelationOptions,
}

impl<'a> ConversationCorrelator<'a> {
    /// Create a correlator over `conn`, naming senders from `index`
    #[must_use]
    pub const fn new(conn: &'a Connection, index: &'a PhoneIndex, options: CorrelationOptions) -> Self {
        Self { conn, index, options }
    }

    /// All conversation IDs, ascending
    pub fn conversation_ids(&self) -> Result<Vec<i64>> {
        let sql = format!("SELECT {id} FROM {table} ORDER BY {id}", id = chat::ID, table = chat::TABLE);
        let failed = |e| ExtractError::correlation(None, e);

        let mut stmt = self.conn.prepare(&sql).map_err(failed)?;
        let ids = stmt
            .query_map([], |row| row.get(0))
            .map_err(failed)?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .map_err(failed)?;
        Ok(ids)
    }

    /// Message IDs of one conversation, ascending
    pub fn message_ids(&self, conversation_id: i64) -> Result<Vec<i64>> {
        let sql = format!(
            "SELECT {message} FROM {table} WHERE {chat} = ?1 ORDER BY {message}",
            message = chat_message_join::MESSAGE_ID,
            table = chat_message_join::TABLE,
            chat = chat_message_join::CHAT_ID,
        );
        let failed = |e| ExtractError::correlation(Some(conversation_id), e);

        let mut stmt = self.conn.prepare(&sql).map_err(failed)?;
        let ids = stmt
            .query_map([conversation_id], |row| row.get(0))
            .map_err(failed)?
            .collect::<rusqlite::Result<Vec<i64>>>()
            .map_err(failed)?;
        Ok(ids)
    }

    /// Fetch messages by ID, joined with their handle
    ///
    /// Messages whose handle is missing are still returned, with an empty
    /// `handle_id`. IDs are queried `batch_size` at a time.
    pub fn fetch_messages(&self, conversation_id: i64, ids: &[i64]) -> Result<Vec<MessageRecord>> {
        let failed = |e| ExtractError::correlation(Some(conversation_id), e);
        let mut messages = Vec::with_capacity(ids.len());

        for batch in ids.chunks(self.options.batch_size.max(1)) {
            let sql = message_batch_sql(batch.len());
            let mut stmt = self.conn.prepare_cached(&sql).map_err(failed)?;
            let rows = stmt
                .query_map(params_from_iter(batch), map_message)
                .map_err(failed)?;
            for row in rows {
                messages.push(row.map_err(failed)?);
            }
        }

        Ok(messages)
    }

    /// First attachment of a message, if any
    ///
    /// Goes message → `message_attachment_join` → `attachment` in one query.
    /// When several attachments are linked, the earliest link wins.
    pub fn resolve_attachment(&self, conversation_id: i64, message_id: i64) -> Result<Option<Attachment>> {
        let sql = format!(
            "SELECT a.{att_id}, a.{filename} FROM {join} j \
             JOIN {att} a ON a.{att_id} = j.{join_att} \
             WHERE j.{join_msg} = ?1 ORDER BY j.ROWID LIMIT 1",
            att_id = attachment::ID,
            filename = attachment::FILENAME,
            join = message_attachment_join::TABLE,
            att = attachment::TABLE,
            join_att = message_attachment_join::ATTACHMENT_ID,
            join_msg = message_attachment_join::MESSAGE_ID,
        );

        let failed = |e| ExtractError::correlation(Some(conversation_id), e);

        let mut stmt = self.conn.prepare_cached(&sql).map_err(failed)?;
        let attachment = stmt
            .query_row([message_id], |row| {
                Ok(Attachment {
                    attachment_id: row.get(0)?,
                    filename: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })
            .optional()
            .map_err(failed)?;
        Ok(attachment)
    }

    /// Turn fetched messages into transcript rows
    pub fn transcript_rows(&self, conversation_id: i64, messages: &[MessageRecord]) -> Result<(Vec<TranscriptRow>, usize)> {
        let mut rows = Vec::with_capacity(messages.len());
        let mut unresolved = 0usize;

        for msg in messages {
            let date = apple_timestamp(msg.raw_timestamp, self.options.local_time).unwrap_or_else(|| {
                warn!(message_id = msg.message_id, raw = msg.raw_timestamp, "Message date out of range");
                String::new()
            });

            let attachment = if msg.has_attachment {
                self.resolve_attachment(conversation_id, msg.message_id)?
                    .map(|a| a.filename)
                    .unwrap_or_default()
            } else {
                String::new()
            };

            let (first, last) = if msg.is_from_self {
                (self.options.self_label.clone(), String::new())
            } else if let Some(name) = self.index.lookup(&msg.handle_id) {
                (name.first.clone(), name.last.clone())
            } else {
                unresolved += 1;
                (String::new(), String::new())
            };

            rows.push(TranscriptRow {
                date,
                handle_id: msg.handle_id.clone(),
                first,
                last,
                message: InputValidator::sanitize_text(&msg.text),
                attachment,
            });
        }

        Ok((rows, unresolved))
    }

    /// Correlate one conversation
    pub fn correlate(&self, conversation_id: i64) -> Result<Transcript> {
        let ids = self.message_ids(conversation_id)?;
        let messages = self.fetch_messages(conversation_id, &ids)?;
        let (rows, unresolved) = self.transcript_rows(conversation_id, &messages)?;

        debug!(conversation_id, messages = rows.len(), unresolved, "Correlated conversation");
        Ok(Transcript {
            conversation_id,
            rows,
            unresolved,
        })
    }

    /// Write one transcript per conversation into `output_dir`
    pub fn run(&self, output_dir: &Path, metrics: &mut MetricsCollector) -> Result<CorrelationSummary> {
        fs::create_dir_all(output_dir)?;

        let ids = self.conversation_ids()?;
        info!(conversations = ids.len(), "Correlating conversations");

        let mut summary = CorrelationSummary::default();
        for id in ids {
            let transcript = self.correlate(id)?;
            let path = table_path(output_dir, &transcript.file_stem(), self.options.format);
            let cells: Vec<Vec<String>> = transcript.rows.iter().cloned().map(TranscriptRow::into_cells).collect();

            write_table(&path, self.options.format, &TranscriptRow::HEADER, &cells)?;

            metrics.record_transcript(cells.len(), transcript.unresolved);
            summary.messages += cells.len();
            summary.unresolved += transcript.unresolved;
            summary.written.push(path);
        }

        info!(
            transcripts = summary.written.len(),
            messages = summary.messages,
            unresolved = summary.unresolved,
            "Correlation finished"
        );
        Ok(summary)
    }
}

fn message_batch_sql(len: usize) -> String {
    let placeholders = vec!["?"; len].join(", ");
    format!(
        "SELECT m.{id}, m.{date}, m.{from_me}, m.{text}, h.{handle}, m.{has_att} \
         FROM {message} m LEFT JOIN {handles} h ON m.{handle_fk} = h.{handle_pk} \
         WHERE m.{id} IN ({placeholders}) ORDER BY m.{id}",
        id = message::ID,
        date = message::DATE,
        from_me = message::IS_FROM_ME,
        text = message::TEXT,
        handle = handle::IDENTIFIER,
        has_att = message::HAS_ATTACHMENTS,
        message = message::TABLE,
        handles = handle::TABLE,
        handle_fk = message::HANDLE_ID,
        handle_pk = handle::ID,
    )
}

fn map_message(row: &Row) -> rusqlite::Result<MessageRecord> {
    Ok(MessageRecord {
        message_id: row.get(0)?,
        raw_timestamp: row.get::<_, Option<i64>>(1)?.unwrap_or_default(),
        is_from_self: row.get::<_, Option<i64>>(2)?.unwrap_or_default() != 0,
        text: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
        handle_id: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
        has_attachment: row.get::<_, Option<i64>>(5)?.unwrap_or_default() != 0,
    })
}
