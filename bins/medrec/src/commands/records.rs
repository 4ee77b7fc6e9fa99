//! `medrec records`

use super::Labels;
use crate::context::AppContext;
use crate::output::OutputFormat;
use anyhow::Result;
use medrec_api_client::endpoints::RecordsApi;
use medrec_sync::Resource;

const LABELS: Labels = Labels {
    title: "Medical records",
    noun: "record",
};

fn resource(ctx: &AppContext) -> Resource<RecordsApi> {
    Resource::new(ctx.client.records())
}

pub async fn list(ctx: &AppContext, format: OutputFormat) -> Result<()> {
    super::list(&resource(ctx), &LABELS, format).await
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
