use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::config::S3Config;

/// Keeps the original uploaded documents in S3 / MinIO.
#[derive(Clone)]
pub struct DocumentArchive {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl DocumentArchive {
    /// Constructs an S3 client configured for MinIO (local) or AWS (production).
    pub async fn connect(config: &S3Config) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "resume-api-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.endpoint)
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&s3_config),
            bucket: config.bucket.clone(),
        }
    }

    /// Stores `data` under `resumes/{resume_id}/{file_name}` and returns the key.
    pub async fn put(
        &self,
        resume_id: Uuid,
        file_name: &str,
        content_type: Option<&str>,
        data: Bytes,
    ) -> Result<String, aws_sdk_s3::Error> {
        let key = object_key(resume_id, file_name);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .set_content_type(content_type.map(String::from))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(aws_sdk_s3::Error::from)?;

        info!("Archived original document at s3://{}/{}", self.bucket, key);
        Ok(key)
    }
}

fn object_key(resume_id: Uuid, file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    format!("resumes/{resume_id}/{base}")
}
