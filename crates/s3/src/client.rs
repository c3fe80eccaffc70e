//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from ossadm-core.

use async_trait::async_trait;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_smithy_runtime_api::client::orchestrator::HttpResponse;
use aws_smithy_runtime_api::client::result::SdkError;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;

use ossadm_core::{
    Alias, Error, MultipartEntry, ObjectPage, ObjectStore, PageCursor, Result, UploadCursor,
    UploadPage,
};

/// S3 client wrapper
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from an alias configuration
    pub async fn new(alias: &Alias) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            alias.access_key.clone(),
            alias.secret_key.clone(),
            None, // session token
            None, // expiry
            "ossadm-static-credentials",
        );

        // Retries are owned by the removal engine, not the SDK
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(alias.region.clone()))
            .endpoint_url(&alias.endpoint)
            .retry_config(aws_config::retry::RetryConfig::disabled())
            .load()
            .await;

        // Path-style addressing for compatibility
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(alias.bucket_lookup == "path" || alias.bucket_lookup == "auto")
            .build();

        tracing::debug!(alias = %alias.name, endpoint = %alias.endpoint, "Created S3 client");

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }

    /// Format AWS SDK error into a detailed error message
    fn format_sdk_error<E>(error: &SdkError<E, HttpResponse>) -> String
    where
        E: ProvideErrorMetadata + std::fmt::Display,
    {
        match error {
            SdkError::ServiceError(service_err) => {
                let err = service_err.err();
                let mut msg = format!("Service error: {err}");
                if let Some(code) = err.code() {
                    msg.push_str(&format!(" (code: {code})"));
                } else if let Some(code) = service_err.raw().headers().get("x-amz-error-code") {
                    msg.push_str(&format!(" (code: {code})"));
                }
                msg
            }
            SdkError::ConstructionFailure(err) => {
                format!("Request construction failed: {err:?}")
            }
            SdkError::TimeoutError(_) => "Request timeout".to_string(),
            SdkError::DispatchFailure(err) => format!("Network dispatch error: {err:?}"),
            SdkError::ResponseError(err) => format!("Response error: {err:?}"),
            _ => error.to_string(),
        }
    }

    /// Map an SDK error onto the core error kinds by its S3 error code
    fn map_sdk_error<E>(error: SdkError<E, HttpResponse>, resource: &str) -> Error
    where
        E: ProvideErrorMetadata + std::fmt::Display,
    {
        let msg = Self::format_sdk_error(&error);
        classify_error_code(error_code(&error), msg, resource)
    }
}

fn error_code<E: ProvideErrorMetadata>(error: &SdkError<E, HttpResponse>) -> Option<&str> {
    error.as_service_error().and_then(|e| e.code())
}

/// DeleteObject on an absent key succeeds; some gateways still answer NoSuchKey
fn is_missing_key<E: ProvideErrorMetadata>(error: &SdkError<E, HttpResponse>) -> bool {
    error_code(error) == Some("NoSuchKey")
}

/// Error kind for an S3 error code; anything unrecognised is transient
fn classify_error_code(code: Option<&str>, msg: String, resource: &str) -> Error {
    match code {
        Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch" | "ExpiredToken") => {
            Error::Auth(msg)
        }
        Some("NoSuchBucket" | "NoSuchKey" | "NoSuchUpload" | "NotFound") => {
            Error::NotFound(format!("{resource}: {msg}"))
        }
        Some("BucketNotEmpty") => Error::Conflict(format!("Bucket not empty: {resource}")),
        Some("NotImplemented") => Error::UnsupportedFeature(msg),
        _ => Error::Network(msg),
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_objects(
        &self,
        bucket: &str,
        cursor: &PageCursor,
        max_keys: i32,
    ) -> Result<ObjectPage> {
        let mut request = self
            .inner
            .list_objects()
            .bucket(bucket)
            .max_keys(max_keys);

        if !cursor.prefix.is_empty() {
            request = request.prefix(&cursor.prefix);
        }
        if !cursor.marker.is_empty() {
            request = request.marker(&cursor.marker);
        }
        if !cursor.delimiter.is_empty() {
            request = request.delimiter(&cursor.delimiter);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, bucket))?;

        let keys = response
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect();

        Ok(ObjectPage {
            keys,
            next_marker: response.next_marker().map(str::to_string),
            truncated: response.is_truncated().unwrap_or(false),
            prefix: response.prefix().map(str::to_string),
        })
    }

    async fn delete_objects_quiet(&self, bucket: &str, keys: Vec<String>) -> Result<Vec<String>> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let objects = keys
            .iter()
            .map(|k| ObjectIdentifier::builder().key(k).build())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::General(format!("delete_objects: {e}")))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| Error::General(format!("delete_objects: {e}")))?;

        let response = self
            .inner
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, bucket))?;

        // Quiet mode only reports the failures
        let mut failed = Vec::new();
        for err in response.errors() {
            match err.key() {
                Some(key) => {
                    tracing::debug!(
                        bucket,
                        key,
                        code = err.code().unwrap_or_default(),
                        "Object not deleted"
                    );
                    failed.push(key.to_string());
                }
                None => tracing::warn!(
                    bucket,
                    code = err.code().unwrap_or_default(),
                    "Delete error without a key"
                ),
            }
        }

        Ok(failed)
    }

    async fn delete_object(&self, bucket: &str, key: &str) -> Result<()> {
        let result = self
            .inner
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_missing_key(&e) => Ok(()),
            Err(e) => Err(Self::map_sdk_error(e, &format!("{bucket}/{key}"))),
        }
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.inner
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, bucket))?;

        Ok(())
    }

    async fn list_multipart_uploads(
        &self,
        bucket: &str,
        cursor: &UploadCursor,
        max_uploads: i32,
    ) -> Result<UploadPage> {
        let mut request = self
            .inner
            .list_multipart_uploads()
            .bucket(bucket)
            .max_uploads(max_uploads);

        if !cursor.prefix.is_empty() {
            request = request.prefix(&cursor.prefix);
        }
        if !cursor.key_marker.is_empty() {
            request = request.key_marker(&cursor.key_marker);
            if !cursor.upload_id_marker.is_empty() {
                request = request.upload_id_marker(&cursor.upload_id_marker);
            }
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, bucket))?;

        let entries = response
            .uploads()
            .iter()
            .filter_map(|u| match (u.key(), u.upload_id()) {
                (Some(key), Some(id)) => Some(MultipartEntry::new(key, id)),
                _ => None,
            })
            .collect();

        Ok(UploadPage {
            entries,
            next_key_marker: response.next_key_marker().map(str::to_string),
            next_upload_id_marker: response.next_upload_id_marker().map(str::to_string),
            truncated: response.is_truncated().unwrap_or(false),
            prefix: response.prefix().map(str::to_string),
        })
    }

    async fn abort_multipart_upload(&self, bucket: &str, key: &str, upload_id: &str) -> Result<()> {
        self.inner
            .abort_multipart_upload()
            .bucket(bucket)
            .key(key)
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| Self::map_sdk_error(e, &format!("{bucket}/{key}")))?;

        Ok(())
    }
}
