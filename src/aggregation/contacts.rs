use crate::corpus::CorpusSource;
use crate::error::Result;
use crate::models::{Contact, IncidentRecord, Module};
use std::collections::HashSet;

/// Contacts owning the incident's module plus any management escalation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContactRouting {
    pub contacts: Vec<Contact>,
    pub escalation_contacts: Vec<Contact>,
}

/// Resolve who to call for `record`.
///
/// Every contact of the module comes back in escalation order (L3, team
/// lead, management), then by name. An unknown module has no owners. Urgent
/// incidents additionally pull in the module's managers and the cross-module
/// management group when `escalate_management` is set; names already listed
/// are not repeated.
pub fn route_contacts(
    corpus: &dyn CorpusSource,
    record: &IncidentRecord,
    escalate_management: bool,
) -> Result<ContactRouting> {
    if record.module == Module::Other {
        return Ok(ContactRouting::default());
    }

    let mut contacts = corpus.contacts(record.module)?;
    contacts.sort_by(|a, b| {
        a.role
            .priority()
            .cmp(&b.role.priority())
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut escalation_contacts = Vec::new();
    if escalate_management && record.severity.is_urgent() {
        let mut seen: HashSet<String> = contacts.iter().map(|c| c.name.clone()).collect();
        let mut managers = corpus.management_contacts(record.module)?;
        managers.sort_by(|a, b| a.name.cmp(&b.name));
        for manager in managers {
            if seen.insert(manager.name.clone()) {
                escalation_contacts.push(manager);
            }
        }
    }

    Ok(ContactRouting {
        contacts,
        escalation_contacts,
    })
}
