//! `medrec prescriptions`
//!
//! Prescriptions are FHIR MedicationRequest documents. Listing goes through
//! the search endpoint; mutations refetch with the same filter.

use super::Labels;
use crate::context::AppContext;
use crate::output::{parse_json_object, OutputFormat};
use anyhow::Result;
use medrec_sync::{MedicationRequests, Resource};

const LABELS: Labels = Labels {
    title: "Prescriptions",
    noun: "prescription",
};

fn resource(ctx: &AppContext) -> Resource<MedicationRequests> {
    Resource::new(MedicationRequests::all(ctx.client.prescriptions()))
}

pub async fn search(ctx: &AppContext, filter: Option<&str>, format: OutputFormat) -> Result<()> {
    let prescriptions = ctx.client.prescriptions();
    let api = match filter {
        Some(raw) => MedicationRequests::matching(prescriptions, parse_json_object(raw)?),
        None => MedicationRequests::all(prescriptions),
    };
    super::list(&Resource::new(api), &LABELS, format).await
}

pub async fn get(ctx: &AppContext, id: &str, format: OutputFormat) -> Result<()> {
    super::get(&resource(ctx), id, format).await
}

pub async fn create(ctx: &AppContext, json: &str, format: OutputFormat) -> Result<()> {
    super::create(&resource(ctx), json, &LABELS, format).await
}

pub async fn update(ctx: &AppContext, id: &str, json: &str, format: OutputFormat) -> Result<()> {
    super::update(&resource(ctx), id, json, &LABELS, format).await
}

pub async fn delete(ctx: &AppContext, id: &str, format: OutputFormat) -> Result<()> {
    super::delete(&resource(ctx), id, &LABELS, format).await
}
