//! Database schema definitions
//!
//! Table and column names of the SQLite stores found inside an iOS backup.
//! These are Apple's names; nothing here is created by this crate.

/// Manifest catalog (`Manifest.db`)
pub mod files {
    /// Table name
    pub const TABLE: &str = "Files";
    /// Content-derived identifier, also the on-disk name
    pub const FILE_ID: &str = "fileID";
    /// Application domain
    pub const DOMAIN: &str = "domain";
    /// Path relative to the domain root
    pub const RELATIVE_PATH: &str = "relativePath";
}

/// Address book full-text search table
pub mod contacts {
    /// Table name
    pub const TABLE: &str = "ABPersonFullTextSearch_content";
    /// First name column
    pub const FIRST: &str = "c0First";
    /// Last name column
    pub const LAST: &str = "c1Last";
    /// Middle name column
    pub const MIDDLE: &str = "c2Middle";
    /// Organization column
    pub const ORGANIZATION: &str = "c6Organization";
    /// Space separated phone spellings
    pub const PHONE: &str = "c16Phone";
    /// E-mail column
    pub const EMAIL: &str = "c17Email";
    /// Address column
    pub const ADDRESS: &str = "c18Address";
}

/// Conversations (`chat`)
pub mod chat {
    /// Table name
    pub const TABLE: &str = "chat";
    /// Primary key column
    pub const ID: &str = "ROWID";
}

/// Conversation membership (`chat_message_join`)
pub mod chat_message_join {
    /// Table name
    pub const TABLE: &str = "chat_message_join";
    /// Foreign key to `chat`
    pub const CHAT_ID: &str = "chat_id";
    /// Foreign key to `message`
    pub const MESSAGE_ID: &str = "message_id";
}

/// Messages table schema
pub mod message {
    /// Table name
    pub const TABLE: &str = "message";
    /// Primary key column
    pub const ID: &str = "ROWID";
    /// Time since 2001-01-01, seconds or nanoseconds
    pub const DATE: &str = "date";
    /// Flag indicating if message is from current user
    pub const IS_FROM_ME: &str = "is_from_me";
    /// Message text content column
    pub const TEXT: &str = "text";
    /// Foreign key to `handle`
    pub const HANDLE_ID: &str = "handle_id";
    /// Flag indicating if message has attachments
    pub const HAS_ATTACHMENTS: &str = "cache_has_attachments";
}

/// Senders (`handle`)
pub mod handle {
    /// Table name
    pub const TABLE: &str = "handle";
    /// Primary key column
    pub const ID: &str = "ROWID";
    /// Phone number or account string
    pub const IDENTIFIER: &str = "id";
}

/// Message to attachment links (`message_attachment_join`)
pub mod message_attachment_join {
    /// Table name
    pub const TABLE: &str = "message_attachment_join";
    /// Foreign key to `message`
    pub const MESSAGE_ID: &str = "message_id";
    /// Foreign key to `attachment`
    pub const ATTACHMENT_ID: &str = "attachment_id";
}

/// Attachments table schema
pub mod attachment {
    /// Table name
    pub const TABLE: &str = "attachment";
    /// Primary key column
    pub const ID: &str = "ROWID";
    /// Attachment filename column
    pub const FILENAME: &str = "filename";
}
