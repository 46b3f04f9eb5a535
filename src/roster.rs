//! CSV roster import: `name,email,phone,ranking,partner`.
//!
//! Only `name` is required. `partner` holds another row's name; when two rows name each other
//! the pair is linked. Imported participants are confirmed.

use crate::models::{Participant, RegistrationStatus};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("Line {line}: name is required")]
    MissingName { line: u64 },
    #[error("Line {line}: duplicate name {name:?}")]
    DuplicateName { line: u64, name: String },
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    phone: Option<String>,
    #[serde(default)]
    ranking: Option<f64>,
    #[serde(default)]
    partner: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn parse_participants<R: Read>(reader: R) -> Result<Vec<Participant>, RosterError> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);

    let mut participants: Vec<Participant> = Vec::new();
    let mut partners: Vec<Option<String>> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for record in csv.deserialize::<RosterRow>() {
        let row = record?;
        // Header is line 1.
        let line = participants.len() as u64 + 2;
        let name = row.name.trim();
        if name.is_empty() {
            return Err(RosterError::MissingName { line });
        }
        let key = name.to_lowercase();
        if by_name.contains_key(&key) {
            return Err(RosterError::DuplicateName {
                line,
                name: name.to_string(),
            });
        }
        by_name.insert(key, participants.len());

        let mut p = Participant::new(name);
        p.email = non_empty(row.email);
        p.phone = non_empty(row.phone);
        p.ranking = row.ranking;
        p.status = RegistrationStatus::Confirmed;
        participants.push(p);
        partners.push(non_empty(row.partner).map(|n| n.to_lowercase()));
    }

    let lookup = |name: &Option<String>| name.as_ref().and_then(|n| by_name.get(n)).copied();
    for (i, partner) in partners.iter().enumerate() {
        let Some(j) = lookup(partner) else { continue };
        if j != i && lookup(&partners[j]) == Some(i) {
            participants[i].partner_id = Some(participants[j].id);
        }
    }

    log::info!("Imported {} participant(s) from roster", participants.len());
    Ok(participants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutual_partners_are_linked() {
        let data = "name,email,phone,ranking,partner\n\
                    Ana,ana@example.com,,4.5,Bea\n\
                    Bea,,,3.5,ana\n\
                    Cris,,,,Ana\n";
        let ps = parse_participants(data.as_bytes()).unwrap();
        assert_eq!(ps.len(), 3);
        assert_eq!(ps[0].partner_id, Some(ps[1].id));
        assert_eq!(ps[1].partner_id, Some(ps[0].id));
        assert_eq!(ps[2].partner_id, None);
        assert_eq!(ps[0].email.as_deref(), Some("ana@example.com"));
        assert_eq!(ps[1].ranking, Some(3.5));
        assert!(ps.iter().all(Participant::is_confirmed));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let data = "name\nAna\nana\n";
        assert!(matches!(
            parse_participants(data.as_bytes()),
            Err(RosterError::DuplicateName { line: 3, .. })
        ));
    }
}
