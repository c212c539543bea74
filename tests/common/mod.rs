//! Port-operations fixture corpus shared by the integration tests

#![allow(dead_code)]

use llm_incident_context::config::Config;
use llm_incident_context::corpus::{InMemoryCorpus, InMemoryCorpusBuilder};
use llm_incident_context::models::{
    CaseRecord, Contact, ContactRole, IncidentType, KbPassage, Module,
};

pub const SCENARIO_A: &str =
    "EDI message REF-IFT-0007 stuck in ERROR status since this morning; ack_at is NULL";
pub const SCENARIO_B: &str = "Customer seeing duplicate containers for CMAU0000020";
pub const SCENARIO_C: &str = "Cannot create vessel advice for MV Lion City 07 - VESSEL_ERR_4";
pub const NO_MATCH: &str = "Zebra quokka xylophone";

pub const EDI_ADVICE_LOG: &str = "\
2025-10-09T08:25:33.050Z INFO edi-advice-service Service started, listening for IFTMIN batches
2025-10-09T08:30:01.120Z ERROR edi-advice-service EDI_ERR_1 Segment missing for REF-IFT-0007; message parked in ERROR status
2025-10-09T08:30:05.410Z WARN edi-advice-service ack_at NULL for REF-IFT-0007 after retry
2025-10-09T08:35:00.000Z INFO edi-advice-service heartbeat ok
";

pub const CONTAINER_LOG: &str = "\
2025-10-09T07:58:12.001Z INFO gate-service Gate in recorded for CMAU0000020 at yard B2
2025-10-09T07:58:12.870Z ERROR container-service Duplicate key violation inserting CMAU0000020 into container_master
2025-10-09T08:00:00.000Z INFO container-service Snapshot written
";

pub const VESSEL_ADVICE_LOG: &str = "\
2025-10-09T06:10:44.300Z ERROR vessel-advice-service VESSEL_ERR_4 Cannot create vessel advice for MV LION CITY 07: active advice already exists
2025-10-09T06:11:00.000Z INFO berth-service Berth plan refreshed
";

pub const API_EVENT_LOG: &str = "\
2025-10-09T08:40:00.000Z INFO api-gateway Scheduler tick
";

pub fn cases() -> Vec<CaseRecord> {
    vec![
        CaseRecord::new(
            "C001",
            "EDI message stuck in ERROR status, ack_at NULL for partner CODECO",
            "Reset the message status and requeue it from the EDI console",
            Module::Edi,
            IncidentType::StuckProcess,
            "resolved",
        ),
        CaseRecord::new(
            "C002",
            "Duplicate container record created for CMAU0000020 after gate in",
            "Keep the oldest record and merge gate events into it",
            Module::Container,
            IncidentType::DuplicateEntry,
            "resolved",
        ),
        CaseRecord::new(
            "C003",
            "Two identical container entries shown in yard inventory",
            "Remove the stale inventory row",
            Module::Container,
            IncidentType::DuplicateEntry,
            "resolved",
        ),
        CaseRecord::new(
            "C004",
            "VESSEL_ERR_4 raised when creating vessel advice, advice already exists for voyage",
            "Close the active advice, then create the new one",
            Module::Vessel,
            IncidentType::ErrorStatus,
            "resolved",
        ),
        CaseRecord::new(
            "C005",
            "Vessel berth schedule service timed out",
            "Restart the berth planner",
            Module::Vessel,
            IncidentType::Timeout,
            "resolved",
        ),
        CaseRecord::new(
            "C006",
            "Database query timeout on container_master table",
            "Add the missing index",
            Module::Database,
            IncidentType::Timeout,
            "resolved",
        ),
        CaseRecord::new(
            "C007",
            "Container gate out stuck pending customs release",
            "Ask customs to re-send the release",
            Module::Container,
            IncidentType::StuckProcess,
            "resolved",
        ),
        CaseRecord::new(
            "C008",
            "Duplicate primary key in vessel_call table",
            "Drop the duplicated row",
            Module::Database,
            IncidentType::DuplicateEntry,
            "resolved",
        ),
        CaseRecord::new(
            "C009",
            "BAPLIE message not acknowledged, stuck in pending status",
            "Resend the BAPLIE to the partner",
            Module::Edi,
            IncidentType::StuckProcess,
            "resolved",
        ),
        CaseRecord::new(
            "C010",
            "EDI API rejected IFTMIN message with parse error",
            "Fix the segment and resubmit",
            Module::Edi,
            IncidentType::ErrorStatus,
            "workaround",
        ),
    ]
}

pub fn kb_passages() -> Vec<KbPassage> {
    vec![
        KbPassage::new(
            vec!["EDI".into(), "Stuck Messages".into()],
            "When an EDI message is stuck in ERROR status, check ack_at. Step 1: locate the message by reference. Step 2: requeue it from the EDI console.",
            0,
        ),
        KbPassage::new(
            vec!["Container".into(), "Duplicate Records".into()],
            "Duplicate container records usually come from a double gate in event. Procedure: keep the oldest record and merge the rest.",
            1,
        ),
        KbPassage::new(
            vec!["Vessel".into(), "Vessel Advice".into()],
            "A vessel advice cannot be created while an active advice exists for the same vessel. Close the active advice first.",
            2,
        ),
        KbPassage::new(
            vec!["Database".into(), "Timeouts".into()],
            "Long running queries on container_master cause timeouts; check for locks.",
            3,
        ),
        KbPassage::new(
            vec!["General".into(), "Escalation".into()],
            "Escalate to the module L3 engineer first, then the team lead.",
            4,
        ),
    ]
}

pub fn contacts() -> Vec<Contact> {
    vec![
        Contact::new("Marcus Lee", ContactRole::TeamLead, Module::Edi),
        Contact::new("Priya Raman", ContactRole::L3Engineer, Module::Edi)
            .with_email("priya.raman@example.com"),
        Contact::new("Daniel Tan", ContactRole::TeamLead, Module::Vessel),
        Contact::new("Hannah Koh", ContactRole::L3Engineer, Module::Vessel),
        Contact::new("Wei Lin", ContactRole::L3Engineer, Module::Container),
        Contact::new("Aisha Noor", ContactRole::L3Engineer, Module::Database),
        Contact::new("Grace Ong", ContactRole::Management, Module::Other),
    ]
}

/// Builder preloaded with every log service
pub fn logs_builder() -> InMemoryCorpusBuilder {
    InMemoryCorpus::builder()
        .service_log_text("edi_advice", EDI_ADVICE_LOG)
        .service_log_text("container", CONTAINER_LOG)
        .service_log_text("vessel_advice", VESSEL_ADVICE_LOG)
        .service_log_text("api_event", API_EVENT_LOG)
}

/// The complete fixture corpus
pub fn full_corpus() -> InMemoryCorpus {
    logs_builder()
        .cases(cases())
        .kb_passages(kb_passages())
        .contacts(contacts())
        .build()
}

/// Defaults with the bundle cache switched off
pub fn uncached_config() -> Config {
    let mut config = Config::default();
    config.aggregation.cache_ttl_secs = 0;
    config
}
