//! Streamed CSV exports.
//!
//! An adapter turns a collection of catalog objects into CSV records; [`stream`]
//! sends them as a downloadable attachment, one chunk per record so large
//! exports are never buffered whole.

use crate::{
    errors::AppError,
    models::{dataset::DatasetDocument, discussion::Thread},
};
use axum::{
    body::Body,
    http::{HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io;

/// Turns domain objects into CSV records.
pub trait CsvAdapter {
    /// Column names, written as the first record.
    fn header(&self) -> &'static [&'static str];

    /// The records, produced lazily.
    fn into_rows(self) -> Box<dyn Iterator<Item = Vec<String>> + Send>;
}

/// One record per indexed dataset.
pub struct DatasetCsvAdapter {
    datasets: Vec<DatasetDocument>,
    site_url: String,
}

impl DatasetCsvAdapter {
    pub fn new(datasets: Vec<DatasetDocument>, site_url: impl Into<String>) -> Self {
        Self {
            datasets,
            site_url: site_url.into(),
        }
    }
}

impl CsvAdapter for DatasetCsvAdapter {
    fn header(&self) -> &'static [&'static str] {
        &[
            "id",
            "title",
            "slug",
            "url",
            "organization",
            "organization_id",
            "description",
            "frequency",
            "license",
            "private",
            "tags",
            "created_at",
            "last_modified",
            "resources_count",
        ]
    }

    fn into_rows(self) -> Box<dyn Iterator<Item = Vec<String>> + Send> {
        let site_url = self.site_url;
        Box::new(self.datasets.into_iter().map(move |doc| {
            let mut row = dataset_columns(&doc, &site_url);
            row.extend([
                doc.dataset.description.clone(),
                doc.dataset.frequency.clone().unwrap_or_default(),
                doc.dataset.license.clone().unwrap_or_default(),
                doc.dataset.private.to_string(),
                doc.dataset.tags.0.join(","),
                timestamp(&doc.dataset.created_at),
                timestamp(&doc.dataset.last_modified),
                doc.resources.len().to_string(),
            ]);
            row
        }))
    }
}

/// One record per resource, prefixed with its dataset's identity.
pub struct ResourcesCsvAdapter {
    datasets: Vec<DatasetDocument>,
    site_url: String,
}

impl ResourcesCsvAdapter {
    pub fn new(datasets: Vec<DatasetDocument>, site_url: impl Into<String>) -> Self {
        Self {
            datasets,
            site_url: site_url.into(),
        }
    }
}

impl CsvAdapter for ResourcesCsvAdapter {
    fn header(&self) -> &'static [&'static str] {
        &[
            "dataset.id",
            "dataset.title",
            "dataset.slug",
            "dataset.url",
            "dataset.organization",
            "dataset.organization_id",
            "id",
            "url",
            "title",
            "description",
            "filetype",
            "format",
            "mime",
            "filesize",
            "created_at",
            "modified",
        ]
    }

    fn into_rows(self) -> Box<dyn Iterator<Item = Vec<String>> + Send> {
        let site_url = self.site_url;
        Box::new(self.datasets.into_iter().flat_map(move |doc| {
            let prefix = dataset_columns(&doc, &site_url);
            doc.resources
                .into_iter()
                .map(move |resource| {
                    let mut row = prefix.clone();
                    row.extend([
                        resource.id.to_string(),
                        resource.url,
                        resource.title,
                        resource.description,
                        resource.filetype,
                        resource.format.unwrap_or_default(),
                        resource.mime.unwrap_or_default(),
                        resource
                            .filesize
                            .map(|size| size.to_string())
                            .unwrap_or_default(),
                        timestamp(&resource.created_at),
                        timestamp(&resource.last_modified),
                    ]);
                    row
                })
                .collect::<Vec<_>>()
        }))
    }
}

/// One record per issue or discussion.
pub struct IssuesOrDiscussionCsvAdapter<I> {
    threads: I,
}

impl<I> IssuesOrDiscussionCsvAdapter<I>
where
    I: Iterator<Item = Thread> + Send + 'static,
{
    pub fn new(threads: I) -> Self {
        Self { threads }
    }
}

impl<I> CsvAdapter for IssuesOrDiscussionCsvAdapter<I>
where
    I: Iterator<Item = Thread> + Send + 'static,
{
    fn header(&self) -> &'static [&'static str] {
        &[
            "id", "user", "subject", "title", "size", "messages", "created", "closed",
            "closed_by",
        ]
    }

    fn into_rows(self) -> Box<dyn Iterator<Item = Vec<String>> + Send> {
        Box::new(self.threads.map(|thread| {
            let messages = thread
                .messages
                .0
                .iter()
                .map(|message| message.content.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            vec![
                thread.id.to_string(),
                thread.user_id.to_string(),
                thread.subject_id.to_string(),
                thread.title,
                thread.messages.0.len().to_string(),
                messages,
                timestamp(&thread.created_at),
                thread.closed_at.as_ref().map(timestamp).unwrap_or_default(),
                thread
                    .closed_by
                    .map(|id| id.to_string())
                    .unwrap_or_default(),
            ]
        }))
    }
}

/// Stream an adapter as a `<basename>.csv` attachment.
pub fn stream<A: CsvAdapter>(adapter: A, basename: &str) -> Result<Response, AppError> {
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}.csv\"", basename))
        .map_err(|_| AppError::internal(format!("invalid export name `{}`", basename)))?;
    let header = encode_record(adapter.header().iter().copied())
        .map_err(|err| AppError::internal(err.to_string()))?;

    let rows = adapter
        .into_rows()
        .map(|row| encode_record(row.iter().map(String::as_str)));
    let chunks = std::iter::once(Ok(header)).chain(rows);

    let mut response = Response::new(Body::from_stream(futures::stream::iter(chunks)));
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/csv; charset=utf-8"),
    );
    headers.insert(header::CONTENT_DISPOSITION, disposition);
    Ok(response)
}

fn encode_record<'a>(fields: impl IntoIterator<Item = &'a str>) -> io::Result<Bytes> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(fields)?;
    let buf = writer.into_inner().map_err(|err| err.into_error())?;
    Ok(Bytes::from(buf))
}

fn dataset_columns(doc: &DatasetDocument, site_url: &str) -> Vec<String> {
    vec![
        doc.dataset.id.to_string(),
        doc.dataset.title.clone(),
        doc.dataset.slug.clone(),
        format!(
            "{}/datasets/{}/",
            site_url.trim_end_matches('/'),
            doc.dataset.slug
        ),
        doc.organization.clone().unwrap_or_default(),
        doc.dataset
            .organization_id
            .map(|id| id.to_string())
            .unwrap_or_default(),
    ]
}

fn timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Secs, true)
}
