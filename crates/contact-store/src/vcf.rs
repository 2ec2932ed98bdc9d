//! vCard 3.0 export of approved contacts.

use crate::types::Contact;

/// Line terminator required by the vCard format.
pub const CRLF: &str = "\r\n";

/// MIME type for exported cards.
pub const VCARD_CONTENT_TYPE: &str = "text/vcard; charset=utf-8";

/// Serialize every approved contact as a vCard, in input order.
///
/// Returns an empty string when no contact is approved.
pub fn export(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .filter(|c| c.is_approved())
        .map(to_vcard)
        .collect()
}

/// Serialize a single contact as a vCard block, regardless of status.
pub fn to_vcard(contact: &Contact) -> String {
    let lines = [
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("FN:{}", escape_text(&contact.name)),
        format!("TEL;TYPE=CELL:{}", contact.phone),
        "END:VCARD".to_string(),
    ];

    let mut card = String::new();
    for line in lines {
        card.push_str(&line);
        card.push_str(CRLF);
    }
    card
}

/// Escape a vCard text value.
fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ',' => escaped.push_str("\\,"),
            ';' => escaped.push_str("\\;"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approved(name: &str, phone: &str) -> Contact {
        let mut c = Contact::new_pending(name.into(), phone.into());
        c.approve();
        c
    }

    #[test]
    fn test_single_card_layout() {
        let card = to_vcard(&approved("Alice", "+254712345678"));
        assert_eq!(
            card,
            "BEGIN:VCARD\r\nVERSION:3.0\r\nFN:Alice\r\nTEL;TYPE=CELL:+254712345678\r\nEND:VCARD\r\n"
        );
    }

    #[test]
    fn test_export_only_approved() {
        let mut rejected = Contact::new_pending("Bob".into(), "+255712345678".into());
        rejected.reject();
        let pending = Contact::new_pending("Carol".into(), "+256712345678".into());
        let contacts = vec![approved("Alice", "+254712345678"), rejected, pending];

        let out = export(&contacts);
        assert_eq!(out.matches("BEGIN:VCARD").count(), 1);
        assert!(out.contains("FN:Alice"));
        assert!(!out.contains("Bob"));
        assert!(!out.contains("Carol"));
    }

    #[test]
    fn test_export_preserves_order() {
        let contacts = vec![
            approved("First", "+254700000001"),
            approved("Second", "+254700000002"),
        ];

        let out = export(&contacts);
        let first = out.find("FN:First").unwrap();
        let second = out.find("FN:Second").unwrap();
        assert!(first < second);
        assert_eq!(out.matches("END:VCARD\r\n").count(), 2);
    }

    #[test]
    fn test_export_empty_when_nothing_approved() {
        assert_eq!(export(&[]), "");
        let pending = Contact::new_pending("Alice".into(), "+254712345678".into());
        assert_eq!(export(&[pending]), "");
    }

    #[test]
    fn test_name_escaping() {
        let card = to_vcard(&approved("Doe, Jane; \\ Jr\r\nSecond", "+254712345678"));
        assert!(card.contains("FN:Doe\\, Jane\\; \\\\ Jr\\nSecond\r\n"));
        assert_eq!(card.matches(CRLF).count(), 5);
    }
}
