//! Paginated file listing.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use filesafe_core::ext::{last_extension, thumbnail_eligible, thumbnail_name};
use filesafe_core::models::{ListedFile, UploaderIdentity};
use filesafe_core::{AppError, FileIndex, ListScope};
use filesafe_storage::THUMBS_DIR;

/// Listing operation: page of file metadata with derived `url`/`thumb`.
/// Administrative identities see every record plus each uploader's display
/// name; everyone else sees only their own.
pub struct ListingService {
    files: Arc<dyn FileIndex>,
    base_url: String,
    page_size: i64,
}

impl ListingService {
    pub fn new(files: Arc<dyn FileIndex>, base_url: String, page_size: i64) -> Self {
        Self {
            files,
            base_url,
            page_size,
        }
    }

    pub async fn list(
        &self,
        identity: &UploaderIdentity,
        album_id: Option<Uuid>,
        page: u32,
    ) -> Result<Vec<ListedFile>, AppError> {
        let scope = ListScope {
            owner_id: if identity.admin { None } else { Some(identity.id) },
            album_id,
        };

        let records = self.files.list_page(scope, page, self.page_size).await?;

        let display_names: HashMap<Uuid, String> = if identity.admin {
            let mut owner_ids: Vec<Uuid> =
                records.iter().filter_map(|record| record.owner_id).collect();
            owner_ids.sort_unstable();
            owner_ids.dedup();
            self.files.display_names(&owner_ids).await?
        } else {
            HashMap::new()
        };

        Ok(records
            .into_iter()
            .map(|record| {
                let extension = last_extension(&record.name);
                let thumb = thumbnail_eligible(&extension).then(|| {
                    format!(
                        "{}/{}/{}",
                        self.base_url,
                        THUMBS_DIR,
                        thumbnail_name(&record.name)
                    )
                });
                let uploader = record
                    .owner_id
                    .and_then(|owner| display_names.get(&owner).cloned());

                ListedFile {
                    id: record.id,
                    url: format!("{}/{}", self.base_url, record.name),
                    thumb,
                    uploader,
                    name: record.name,
                    original_name: record.original_name,
                    size_bytes: record.size_bytes,
                    album_id: record.album_id,
                    created_at: record.created_at,
                }
            })
            .collect())
    }
}
