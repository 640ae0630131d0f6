use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use shared::{
    domain::SnapshotId,
    error::ErrorBody,
    protocol::{
        DiffRequest, DiffResponse, UploadSnapshotResponse, DIFF_ROUTE, UPLOAD_FILES_FIELD,
        UPLOAD_FOLDER_ROUTE, UPLOAD_ID_FIELD,
    },
};
use tracing::debug;
use url::Url;

use crate::{error::ClientError, selection::FileSelection, SnapshotApi};

/// [`SnapshotApi`] over HTTP against the snapshot server's origin.
pub struct HttpSnapshotApi {
    http: Client,
    server_url: Url,
}

impl HttpSnapshotApi {
    pub fn new(server_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(server_url, None)
    }

    /// Without a timeout a request stays pending until the connection resolves it.
    pub fn with_timeout(server_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            server_url: Url::parse(server_url)?,
        })
    }

    pub fn server_url(&self) -> &Url {
        &self.server_url
    }

    fn endpoint(&self, route: &str) -> Result<Url, ClientError> {
        Ok(self.server_url.join(route)?)
    }
}

#[async_trait]
impl SnapshotApi for HttpSnapshotApi {
    async fn upload_folder(
        &self,
        snapshot_id: &SnapshotId,
        selection: &FileSelection,
    ) -> Result<UploadSnapshotResponse, ClientError> {
        let mut form = Form::new().text(UPLOAD_ID_FIELD, snapshot_id.to_string());
        for file in selection.files() {
            let mime_type = mime_guess::from_path(&file.relative_path).first_or_octet_stream();
            let part = Part::bytes(file.contents.clone())
                .file_name(file.relative_path.clone())
                .mime_str(mime_type.essence_str())?;
            form = form.part(UPLOAD_FILES_FIELD, part);
        }

        let url = self.endpoint(UPLOAD_FOLDER_ROUTE)?;
        debug!(%url, files = selection.len(), "posting folder upload");
        let response = self.http.post(url).multipart(form).send().await?;
        read_json(response).await
    }

    async fn diff(
        &self,
        id_a: &SnapshotId,
        id_b: &SnapshotId,
    ) -> Result<DiffResponse, ClientError> {
        let url = self.endpoint(DIFF_ROUTE)?;
        debug!(%url, "posting diff request");
        let response = self
            .http
            .post(url)
            .json(&DiffRequest::new(id_a, id_b))
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .map(|body| body.error);
        return Err(ClientError::Server {
            status: status.as_u16(),
            message,
        });
    }

    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
