//! A small but complete backup on disk, shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ios_backup_extract::config::AppConfig;
use rusqlite::Connection;
use tempfile::TempDir;

pub const CONTACTS_ID: &str = "31bb7ba8914766d4ba40d6dfb6113c8b614be442";
pub const MESSAGES_ID: &str = "3d0d7e5fb2ce288813306e4d4636395e047a3d28";

/// Files in the manifest: (fileID, domain, relativePath, contents)
pub const FILES: [(&str, &str, &str, &[u8]); 6] = [
    ("a1b2c3", "CameraRollDomain", "Media/DCIM/100APPLE/IMG_0001.JPG", b"jpeg-one"),
    ("b2c3d4", "CameraRollDomain", "Media/DCIM/101APPLE/IMG_0001.jpg", b"jpeg-two"),
    ("c3d4e5", "CameraRollDomain", "Media/DCIM/100APPLE/IMG_0002.MOV", b"movie"),
    ("d4e5f6", "CameraRollDomain", "Media/PhotoData/Thumbnails/IMG_0001.jpg", b"thumb"),
    ("e5f6a7", "MediaDomain", "Library/SMS/Attachments/0a/00/photo.jpeg", b"attachment"),
    ("f6a7b8", "MediaDomain", "Library/SMS/Attachments/0b/01/notes.txt", b"text"),
];

pub struct Backup {
    pub root: TempDir,
    pub output: TempDir,
}

impl Backup {
    pub fn new() -> Self {
        let backup = Self {
            root: tempfile::tempdir().unwrap(),
            output: tempfile::tempdir().unwrap(),
        };
        backup.write_manifest();
        backup.write_contacts();
        backup.write_messages();
        backup
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn out(&self) -> &Path {
        self.output.path()
    }

    pub fn shard_path(&self, file_id: &str) -> PathBuf {
        self.path().join(&file_id[..2]).join(file_id)
    }

    pub fn config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        config.backup.root = self.path().to_string_lossy().into_owned();
        config.output.directory = self.out().to_string_lossy().into_owned();
        config
    }

    fn open_shard(&self, file_id: &str) -> Connection {
        let path = self.shard_path(file_id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        Connection::open(path).unwrap()
    }

    fn write_manifest(&self) {
        let conn = Connection::open(self.path().join("Manifest.db")).unwrap();
        conn.execute_batch(
            "CREATE TABLE Files (fileID TEXT PRIMARY KEY, domain TEXT, relativePath TEXT, flags INTEGER, file BLOB);",
        )
        .unwrap();

        for (file_id, domain, relative_path, bytes) in FILES {
            conn.execute(
                "INSERT INTO Files (fileID, domain, relativePath, flags) VALUES (?1, ?2, ?3, 1)",
                (file_id, domain, relative_path),
            )
            .unwrap();
            let path = self.shard_path(file_id);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, bytes).unwrap();
        }
    }

    fn write_contacts(&self) {
        let conn = self.open_shard(CONTACTS_ID);
        conn.execute_batch(
            "CREATE TABLE ABPersonFullTextSearch_content (
                 docid INTEGER PRIMARY KEY, c0First, c1Last, c2Middle,
                 c6Organization, c16Phone, c17Email, c18Address);
             INSERT INTO ABPersonFullTextSearch_content VALUES
                 (1, 'Ann', 'Lee', NULL, NULL, '+1 (555) 123-4567 15551234567 5551234567 1234567 4567', 'ann@example.com', NULL);
             INSERT INTO ABPersonFullTextSearch_content VALUES
                 (2, 'Bob', NULL, 'Q', 'Acme', '555 1234', NULL, '1 Main St');
             INSERT INTO ABPersonFullTextSearch_content VALUES
                 (3, NULL, NULL, NULL, 'Pizza Place', '+1 (555) 999-0000 15559990000 5559990000 9990000 0000', NULL, NULL);",
        )
        .unwrap();
    }

    fn write_messages(&self) {
        let conn = self.open_shard(MESSAGES_ID);
        conn.execute_batch(
            "CREATE TABLE chat (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, guid TEXT);
             CREATE TABLE chat_message_join (chat_id INTEGER, message_id INTEGER, PRIMARY KEY (chat_id, message_id));
             CREATE TABLE handle (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, id TEXT);
             CREATE TABLE message (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, text TEXT, handle_id INTEGER,
                                   date INTEGER, is_from_me INTEGER, cache_has_attachments INTEGER);
             CREATE TABLE message_attachment_join (ROWID INTEGER PRIMARY KEY AUTOINCREMENT,
                                                   message_id INTEGER, attachment_id INTEGER);
             CREATE TABLE attachment (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, filename TEXT);

             INSERT INTO chat VALUES (1, 'iMessage;-;+15551234567'), (2, 'SMS;-;+15559990000'), (3, 'empty');
             INSERT INTO handle VALUES (1, '+15551234567'), (2, '+15559990000');

             INSERT INTO message VALUES (1, 'Hi Ann', 1, 0, 1, 0);
             INSERT INTO message VALUES (2, 'Hi back', 1, 60, 0, 0);
             INSERT INTO message VALUES (3, 'Look', 1, 3600000000000, 0, 1);
             INSERT INTO message VALUES (4, 'Pizza ready', 2, 120, 0, 0);

             INSERT INTO chat_message_join VALUES (1, 3), (1, 1), (1, 2), (2, 4);

             INSERT INTO attachment VALUES (1, '~/Library/SMS/Attachments/0a/00/photo.jpeg');
             INSERT INTO message_attachment_join VALUES (1, 3, 1);",
        )
        .unwrap();
    }
}
