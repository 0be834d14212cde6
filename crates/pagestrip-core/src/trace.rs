use crate::classify::outcome::{ClassCounts, LineClass, Provenance};
use crate::frequency::FrequencyRecord;
use crate::Conversion;
use serde::{Deserialize, Serialize};

pub const AUDIT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub entry_id: String,
    /// 1-based page number.
    pub page_number: usize,
    pub line_index: usize,
    pub class: LineClass,
    pub provenance: Provenance,
    pub kept: bool,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditWarning {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<usize>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrequencySummary {
    pub enabled: bool,
    pub required_pages: usize,
    pub flagged: Vec<FrequencyRecord>,
}

/// Every classification decision of one conversion, ready for JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditBundle {
    pub audit_schema_version: String,
    pub source: String,
    pub page_count: usize,
    /// 1-based numbers of pages whose text came from OCR.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ocr_pages: Vec<usize>,
    pub counts: ClassCounts,
    pub frequency: FrequencySummary,
    pub entries: Vec<AuditEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
}

/// Build the audit bundle for a finished conversion. Blank lines are omitted.
pub fn build_audit(conversion: &Conversion) -> AuditBundle {
    let doc = &conversion.document;

    let entries = doc
        .lines()
        .filter(|l| !l.is_blank())
        .map(|line| AuditEntry {
            entry_id: format!("ln_{}_{}", line.page_index + 1, line.line_index),
            page_number: line.page_index + 1,
            line_index: line.line_index,
            class: line.class,
            provenance: line.provenance.clone(),
            kept: line.is_kept(),
            text: line.text().to_string(),
        })
        .collect();

    let warnings = conversion
        .warnings
        .iter()
        .map(|w| AuditWarning {
            page_number: w.page.map(|p| p + 1),
            message: w.message.clone(),
        })
        .collect();

    AuditBundle {
        audit_schema_version: AUDIT_SCHEMA_VERSION.to_string(),
        source: doc.source.clone(),
        page_count: doc.page_count(),
        ocr_pages: doc.ocr_pages().into_iter().map(|p| p + 1).collect(),
        counts: conversion.counts.clone(),
        frequency: FrequencySummary {
            enabled: conversion.frequency_enabled,
            required_pages: conversion.required_pages,
            flagged: conversion.flagged.clone(),
        },
        entries,
        warnings,
    }
}
