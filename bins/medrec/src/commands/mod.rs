//! Command implementations
//!
//! Records and prescriptions share one flow: every command drives a
//! [`Resource`] so the printed list is the store's state after the backend
//! refetch.

pub mod auth;
pub mod prescriptions;
pub mod records;

use crate::output::{
    parse_json_object, print_json, print_record, print_records, OutputFormat, Status,
};
use anyhow::Result;
use medrec_sync::{Resource, ResourceApi, StoreState};
use serde_json::json;

/// Display names for one resource kind
pub struct Labels {
    pub title: &'static str,
    pub noun: &'static str,
}

pub async fn list<A: ResourceApi>(
    resource: &Resource<A>,
    labels: &Labels,
    format: OutputFormat,
) -> Result<()> {
    resource.list().await?;
    let state = resource.state();
    print_records(labels.title, &state.records, labels.noun, format)
}

pub async fn get<A: ResourceApi>(
    resource: &Resource<A>,
    id: &str,
    format: OutputFormat,
) -> Result<()> {
    let record = resource.get(id).await?;
    print_record(&record, format)
}

pub async fn create<A: ResourceApi>(
    resource: &Resource<A>,
    raw: &str,
    labels: &Labels,
    format: OutputFormat,
) -> Result<()> {
    let body = parse_json_object(raw)?;
    let created = resource.add(&body).await?;
    let state = resource.state();

    if format == OutputFormat::Json {
        return print_json(&json!({ "created": created, "total": state.records.len() }));
    }

    match created.id() {
        Some(id) => Status::success(&format!("Created {} {id}", labels.noun)),
        None => Status::success(&format!("Created {}", labels.noun)),
    }
    report_refetch(&state, labels);
    Ok(())
}

pub async fn update<A: ResourceApi>(
    resource: &Resource<A>,
    id: &str,
    raw: &str,
    labels: &Labels,
    format: OutputFormat,
) -> Result<()> {
    let fields = parse_json_object(raw)?;
    let updated = resource.update(id, &fields).await?;
    let state = resource.state();

    if format == OutputFormat::Json {
        return print_json(&json!({ "updated": updated, "total": state.records.len() }));
    }

    Status::success(&format!("Updated {} {id}", labels.noun));
    report_refetch(&state, labels);
    Ok(())
}

pub async fn delete<A: ResourceApi>(
    resource: &Resource<A>,
    id: &str,
    labels: &Labels,
    format: OutputFormat,
) -> Result<()> {
    resource.remove(id).await?;
    let state = resource.state();

    if format == OutputFormat::Json {
        return print_json(&json!({ "deleted": id, "total": state.records.len() }));
    }

    Status::success(&format!("Deleted {} {id}", labels.noun));
    report_refetch(&state, labels);
    Ok(())
}

fn report_refetch(state: &StoreState, labels: &Labels) {
    match &state.error {
        Some(message) => Status::warning(&format!("Could not reload {}s: {message}", labels.noun)),
        None => Status::info(&format!(
            "{} on the server",
            crate::output::format_count(state.records.len(), labels.noun)
        )),
    }
}
