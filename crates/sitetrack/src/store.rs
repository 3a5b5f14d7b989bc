// ── JSON-file site store ──
//
// Persists the CLI's registry as a JSON array of tracked sites. Every
// call re-reads the file. Creation holds an exclusive lock on a sidecar
// `<file>.lock` for the whole load, check, write and rename, so separate
// processes sharing one file serialize too. Writes go to a uniquely
// named temp file in the same directory that is then renamed over the
// original; readers never see a partial file and take no lock.

use std::ffi::OsString;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use fd_lock::RwLock;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::debug;

use sitetrack_core::{
    CanonicalHost, CreateOutcome, Principal, SiteId, SiteStore, StoreError, TrackedSite,
};

pub struct JsonFileSiteStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileSiteStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<TrackedSite>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => decode(&self.path, &bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(io_error(&self.path, &e)),
        }
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<Vec<TrackedSite>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    serde_json::from_slice(bytes)
        .map_err(|e| StoreError::unavailable(format!("{} is corrupt: {e}", path.display())))
}

fn io_error(path: &Path, e: &std::io::Error) -> StoreError {
    StoreError::unavailable(format!("{}: {e}", path.display()))
}

fn lock_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".lock");
    PathBuf::from(name)
}

/// Load, check and append under the cross-process file lock. Blocking.
fn create_locked(path: &Path, site: TrackedSite) -> Result<CreateOutcome, StoreError> {
    let dir = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, &e))?;
            parent
        }
        None => Path::new("."),
    };

    let lock_file = lock_path(path);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(&lock_file)
        .map_err(|e| io_error(&lock_file, &e))?;
    let mut lock = RwLock::new(file);
    let _held = lock.write().map_err(|e| io_error(&lock_file, &e))?;

    let mut sites = match std::fs::read(path) {
        Ok(bytes) => decode(path, &bytes)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(e) => return Err(io_error(path, &e)),
    };

    if let Some(existing) = sites
        .iter()
        .find(|s| s.owner == site.owner && s.canonical_host == site.canonical_host)
    {
        return Ok(CreateOutcome::Existing(existing.clone()));
    }

    sites.push(site.clone());
    let json =
        serde_json::to_vec_pretty(&sites).map_err(|e| StoreError::unavailable(e.to_string()))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, &e))?;
    tmp.write_all(&json)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| io_error(tmp.path(), &e))?;
    tmp.persist(path).map_err(|e| io_error(path, &e.error))?;

    debug!(path = %path.display(), count = sites.len(), "sites file written");
    Ok(CreateOutcome::Created(site))
}

impl SiteStore for JsonFileSiteStore {
    async fn find_by_owner_and_host(
        &self,
        owner: &Principal,
        host: &CanonicalHost,
    ) -> Result<Option<TrackedSite>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|s| &s.owner == owner && &s.canonical_host == host))
    }

    async fn create_if_absent(&self, site: TrackedSite) -> Result<CreateOutcome, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || create_locked(&path, site))
            .await
            .map_err(|e| StoreError::unavailable(format!("sites file writer failed: {e}")))?
    }

    async fn get_by_id(
        &self,
        owner: &Principal,
        id: &SiteId,
    ) -> Result<Option<TrackedSite>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|s| &s.owner == owner && &s.id == id))
    }

    async fn list_by_owner(&self, owner: &Principal) -> Result<Vec<TrackedSite>, StoreError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|s| &s.owner == owner)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{DateTime, Utc};
    use sitetrack_core::IdScheme;

    use super::*;

    fn site(owner: &str, url: &str) -> TrackedSite {
        let owner = Principal::new(owner);
        let canonical_host = CanonicalHost::parse(url).unwrap();
        let at: DateTime<Utc> = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        TrackedSite {
            id: SiteId::derive(IdScheme::OwnerScoped, &owner, &canonical_host),
            owner,
            display_name: "Site".into(),
            canonical_host,
            raw_url: url.into(),
            tracked: false,
            created_at: at,
            updated_at: at,
        }
    }

    #[tokio::test]
    async fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSiteStore::new(dir.path().join("sites.json"));
        assert!(store.list_by_owner(&Principal::new("u1")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_sites_persist_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("sites.json");
        let s = site("u1", "https://example.com");

        let store = JsonFileSiteStore::new(path.clone());
        assert_eq!(
            store.create_if_absent(s.clone()).await.unwrap(),
            CreateOutcome::Created(s.clone())
        );

        let reopened = JsonFileSiteStore::new(path);
        assert_eq!(
            reopened.get_by_id(&Principal::new("u1"), &s.id).await.unwrap(),
            Some(s.clone())
        );
        assert_eq!(
            reopened.create_if_absent(site("u1", "EXAMPLE.com")).await.unwrap(),
            CreateOutcome::Existing(s)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn separate_instances_on_one_file_create_once() {
        let dir = tempfile::tempdir().unwrap();

        for round in 0..50 {
            let path = dir.path().join(format!("sites-{round}.json"));
            let a = JsonFileSiteStore::new(path.clone());
            let b = JsonFileSiteStore::new(path.clone());

            let (left, right) = tokio::join!(
                a.create_if_absent(site("u1", "example.com")),
                b.create_if_absent(site("u1", "EXAMPLE.com/x")),
            );
            let created = [left.unwrap(), right.unwrap()]
                .iter()
                .filter(|outcome| matches!(outcome, CreateOutcome::Created(_)))
                .count();
            assert_eq!(created, 1, "round {round}");

            let stored = JsonFileSiteStore::new(path)
                .list_by_owner(&Principal::new("u1"))
                .await
                .unwrap();
            assert_eq!(stored.len(), 1, "round {round}");
        }
    }

    #[tokio::test]
    async fn writes_leave_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSiteStore::new(dir.path().join("sites.json"));
        store.create_if_absent(site("u1", "example.com")).await.unwrap();
        store.create_if_absent(site("u1", "example.org")).await.unwrap();

        let mut names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        assert_eq!(names, ["sites.json", "sites.json.lock"]);
    }

    #[tokio::test]
    async fn corrupt_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.json");
        std::fs::write(&path, "{not json").unwrap();

        let err = JsonFileSiteStore::new(path)
            .list_by_owner(&Principal::new("u1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }), "{err:?}");
    }
}
