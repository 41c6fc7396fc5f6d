//! On-disk key repository.
//!
//! One OpenSSH private key file (0600) plus `.pub` per server, named after
//! the sanitised server address.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ssh_key::rand_core::OsRng;
use ssh_key::{Algorithm, LineEnding, PrivateKey};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use wp_orchestrator_core::error::{CoreError, CoreResult};
use wp_orchestrator_core::traits::KeyRepository;
use wp_orchestrator_core::types::KeyMaterial;

const KEY_COMMENT: &str = "wp-orchestrator";

pub struct FileKeyRepository {
    directory: PathBuf,
    /// 串行化生成，保证每台服务器只生成一次
    create_lock: Mutex<()>,
}

impl FileKeyRepository {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            create_lock: Mutex::new(()),
        }
    }

    fn private_path(&self, server: &str) -> PathBuf {
        self.directory.join(file_stem(server))
    }

    fn public_path(&self, server: &str) -> PathBuf {
        self.directory.join(format!("{}.pub", file_stem(server)))
    }

    async fn generate(&self, server: &str) -> CoreResult<KeyMaterial> {
        log::info!("[{server}] Generating Ed25519 key pair");
        let private_key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
            .map_err(|e| key_error("generate key pair", &e))?;
        let private_openssh = private_key
            .to_openssh(LineEnding::LF)
            .map_err(|e| key_error("encode private key", &e))?
            .to_string();
        let public_openssh = format!(
            "{} {KEY_COMMENT}",
            private_key
                .public_key()
                .to_openssh()
                .map_err(|e| key_error("encode public key", &e))?
        );

        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| key_error("create key directory", &e))?;
        write_private(&self.private_path(server), &private_openssh).await?;
        tokio::fs::write(self.public_path(server), format!("{public_openssh}\n"))
            .await
            .map_err(|e| key_error("write public key", &e))?;

        Ok(KeyMaterial {
            private_openssh,
            public_openssh,
        })
    }
}

/// File name for a server address: anything but `[A-Za-z0-9._-]` becomes `_`,
/// and a leading dot is replaced so the name never escapes the directory.
fn file_stem(server: &str) -> String {
    let mut stem: String = server
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if stem.is_empty() || stem.starts_with('.') {
        stem.insert(0, '_');
    }
    stem
}

fn key_error(action: &str, e: &dyn std::fmt::Display) -> CoreError {
    CoreError::KeyMaterial(format!("Failed to {action}: {e}"))
}

/// Write the private key; on unix the file is 0600 before any byte lands.
async fn write_private(path: &Path, contents: &str) -> CoreResult<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);
    let mut file = options
        .open(path)
        .await
        .map_err(|e| key_error("create private key file", &e))?;
    #[cfg(unix)]
    {
        // mode() 只作用于新建文件，已存在的文件需要先收紧权限
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await
            .map_err(|e| key_error("set private key permissions", &e))?;
    }
    file.write_all(contents.as_bytes())
        .await
        .map_err(|e| key_error("write private key", &e))?;
    file.flush()
        .await
        .map_err(|e| key_error("write private key", &e))?;
    Ok(())
}

async fn read_optional(path: &Path) -> CoreResult<Option<String>> {
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(Some(contents)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(key_error(&format!("read {}", path.display()), &e)),
    }
}

async fn remove_optional(path: &Path) -> CoreResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(key_error(&format!("remove {}", path.display()), &e)),
    }
}

#[async_trait]
impl KeyRepository for FileKeyRepository {
    async fn get(&self, server: &str) -> CoreResult<Option<KeyMaterial>> {
        let Some(private_openssh) = read_optional(&self.private_path(server)).await? else {
            return Ok(None);
        };

        let public_openssh = match read_optional(&self.public_path(server)).await? {
            Some(public) => public.trim().to_string(),
            None => {
                // .pub 丢失时从私钥恢复
                let private_key = PrivateKey::from_openssh(&private_openssh)
                    .map_err(|e| key_error("decode private key", &e))?;
                format!(
                    "{} {KEY_COMMENT}",
                    private_key
                        .public_key()
                        .to_openssh()
                        .map_err(|e| key_error("encode public key", &e))?
                )
            }
        };

        Ok(Some(KeyMaterial {
            private_openssh,
            public_openssh,
        }))
    }

    async fn get_or_create(&self, server: &str) -> CoreResult<KeyMaterial> {
        let _guard = self.create_lock.lock().await;
        if let Some(existing) = self.get(server).await? {
            return Ok(existing);
        }
        self.generate(server).await
    }

    async fn remove(&self, server: &str) -> CoreResult<()> {
        remove_optional(&self.private_path(server)).await?;
        remove_optional(&self.public_path(server)).await?;
        log::info!("[{server}] Key pair removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_stem_stays_inside_directory() {
        assert_eq!(file_stem("10.0.0.5"), "10.0.0.5");
        assert_eq!(file_stem("2001:db8::1"), "2001_db8__1");
        assert_eq!(file_stem("../etc/passwd"), "_.._etc_passwd");
        assert_eq!(file_stem(""), "_");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn private_key_overwrite_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("10.0.0.5");
        std::fs::write(&path, "stale key material that is longer than the new one").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_private(&path, "new key").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new key");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn new_private_key_is_created_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("10.0.0.9");
        write_private(&path, "key").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
