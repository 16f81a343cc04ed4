use std::collections::HashSet;
use std::fs;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::domain::{AdId, ImportedAd};

/// Storage abstraction over the ordered ad corpus so the service can run without a backend.
pub trait AdRepository: Send + Sync {
    /// Full collection in insertion order; empty when nothing was stored yet.
    fn get_ads(&self) -> Result<Vec<ImportedAd>, RepositoryError>;
    /// Append one record. Fails with [`RepositoryError::Conflict`] on a duplicate id.
    fn add_ad(&self, ad: ImportedAd) -> Result<(), RepositoryError>;
    /// Replace the record with the same id. Fails with [`RepositoryError::NotFound`] when
    /// no such record exists.
    fn update_ad(&self, ad: ImportedAd) -> Result<(), RepositoryError>;
    /// Remove the record with `id`. Missing ids are ignored.
    fn delete_ad(&self, id: &AdId) -> Result<(), RepositoryError>;
    /// Replace the whole collection.
    fn save_ads(&self, ads: Vec<ImportedAd>) -> Result<(), RepositoryError>;

    fn find_ad(&self, id: &AdId) -> Result<Option<ImportedAd>, RepositoryError> {
        Ok(self.get_ads()?.into_iter().find(|ad| &ad.id == id))
    }
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("ad {0} already exists")]
    Conflict(AdId),
    #[error("ad {0} not found")]
    NotFound(AdId),
    #[error("ad store at {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("ad store io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

fn ensure_unique(ads: &[ImportedAd]) -> Result<(), RepositoryError> {
    let mut seen = HashSet::with_capacity(ads.len());
    for ad in ads {
        if !seen.insert(&ad.id) {
            return Err(RepositoryError::Conflict(ad.id.clone()));
        }
    }
    Ok(())
}

fn append(ads: &mut Vec<ImportedAd>, ad: ImportedAd) -> Result<(), RepositoryError> {
    if ads.iter().any(|existing| existing.id == ad.id) {
        return Err(RepositoryError::Conflict(ad.id));
    }
    ads.push(ad);
    Ok(())
}

fn replace(ads: &mut [ImportedAd], ad: ImportedAd) -> Result<(), RepositoryError> {
    match ads.iter_mut().find(|existing| existing.id == ad.id) {
        Some(slot) => {
            *slot = ad;
            Ok(())
        }
        None => Err(RepositoryError::NotFound(ad.id)),
    }
}

/// Process-local store, mostly for tests and the demo server.
#[derive(Debug, Default)]
pub struct InMemoryAdRepository {
    ads: Mutex<Vec<ImportedAd>>,
}

impl InMemoryAdRepository {
    pub fn with_ads(ads: Vec<ImportedAd>) -> Result<Self, RepositoryError> {
        ensure_unique(&ads)?;
        Ok(Self {
            ads: Mutex::new(ads),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<ImportedAd>>, RepositoryError> {
        self.ads
            .lock()
            .map_err(|_| RepositoryError::Unavailable("ad store mutex poisoned".to_string()))
    }
}

impl AdRepository for InMemoryAdRepository {
    fn get_ads(&self) -> Result<Vec<ImportedAd>, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn add_ad(&self, ad: ImportedAd) -> Result<(), RepositoryError> {
        append(&mut *self.lock()?, ad)
    }

    fn update_ad(&self, ad: ImportedAd) -> Result<(), RepositoryError> {
        replace(&mut *self.lock()?, ad)
    }

    fn delete_ad(&self, id: &AdId) -> Result<(), RepositoryError> {
        self.lock()?.retain(|ad| &ad.id != id);
        Ok(())
    }

    fn save_ads(&self, ads: Vec<ImportedAd>) -> Result<(), RepositoryError> {
        ensure_unique(&ads)?;
        *self.lock()? = ads;
        Ok(())
    }
}

/// JSON document store: the whole collection lives in one file that is rewritten on every
/// mutation through a temp file and rename.
#[derive(Debug)]
pub struct JsonFileAdRepository {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileAdRepository {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<ImportedAd>, RepositoryError> {
        let file = match fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        if file.metadata()?.len() == 0 {
            return Ok(Vec::new());
        }

        serde_json::from_reader(BufReader::new(file)).map_err(|source| RepositoryError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, ads: &[ImportedAd]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        {
            let file = fs::File::create(&staging)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, ads).map_err(std::io::Error::from)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }

        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, RepositoryError> {
        self.write_lock
            .lock()
            .map_err(|_| RepositoryError::Unavailable("ad store lock poisoned".to_string()))
    }

    fn mutate<F>(&self, change: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut Vec<ImportedAd>) -> Result<(), RepositoryError>,
    {
        let _guard = self.lock_writes()?;
        let mut ads = self.read()?;
        change(&mut ads)?;
        self.write(&ads)
    }
}

impl AdRepository for JsonFileAdRepository {
    fn get_ads(&self) -> Result<Vec<ImportedAd>, RepositoryError> {
        self.read()
    }

    fn add_ad(&self, ad: ImportedAd) -> Result<(), RepositoryError> {
        self.mutate(|ads| append(ads, ad))
    }

    fn update_ad(&self, ad: ImportedAd) -> Result<(), RepositoryError> {
        self.mutate(|ads| replace(ads, ad))
    }

    fn delete_ad(&self, id: &AdId) -> Result<(), RepositoryError> {
        self.mutate(|ads| {
            ads.retain(|ad| &ad.id != id);
            Ok(())
        })
    }

    fn save_ads(&self, ads: Vec<ImportedAd>) -> Result<(), RepositoryError> {
        ensure_unique(&ads)?;
        let _guard = self.lock_writes()?;
        self.write(&ads)
    }
}
