// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const RECIPIENT_HEADERS: [&str; 3] = ["To", "Cc", "Bcc"];

/// Sender and recipients of one message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailHeaders {
    pub sender: String,
    pub recipients: Vec<String>,
}

impl MailHeaders {
    /// `sender recipient1 recipient2 ...`
    pub fn to_record(&self) -> String {
        let mut record = self.sender.clone();
        for recipient in &self.recipients {
            record.push(' ');
            record.push_str(recipient);
        }
        record
    }
}

pub fn parse_file(path: &Path) -> io::Result<Option<MailHeaders>> {
    parse(BufReader::new(File::open(path)?))
}

/// Parse the header block (everything before the first empty line).
///
/// The sender is the last word of the first `From:` header. Recipients come
/// from every `To:`, `Cc:` and `Bcc:` header including folded continuation
/// lines. Returns `None` when there is no `From:` header.
pub fn parse<R: BufRead>(mut reader: R) -> io::Result<Option<MailHeaders>> {
    let mut sender = None;
    let mut recipients = Vec::new();
    let mut in_recipients = false;
    let mut raw = Vec::new();

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            break;
        }

        if line.starts_with([' ', '\t']) {
            if in_recipients {
                extract_addresses(line, &mut recipients);
            }
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            in_recipients = false;
            continue;
        };
        let name = name.trim();

        in_recipients = RECIPIENT_HEADERS
            .iter()
            .any(|header| header.eq_ignore_ascii_case(name));
        if in_recipients {
            extract_addresses(value, &mut recipients);
        } else if sender.is_none() && name.eq_ignore_ascii_case("From") {
            sender = extract_address(value);
        }
    }

    Ok(sender.map(|sender| MailHeaders { sender, recipients }))
}

fn extract_addresses(value: &str, recipients: &mut Vec<String>) {
    recipients.extend(value.split(',').filter_map(extract_address));
}

/// Last word of a header item, without angle brackets or quotes.
fn extract_address(item: &str) -> Option<String> {
    let word = item.split_whitespace().last()?;
    let address = word.trim_matches(|c| c == '<' || c == '>' || c == '"');
    (address.len() > 2).then(|| address.to_string())
}
