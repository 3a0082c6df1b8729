//! Encrypted keystore files (Web3 Secret Storage v3, scrypt).
//!
//! The file format itself is handled by the client library; these helpers
//! add directory handling, address reporting and error mapping.

use std::fs;
use std::path::{Path, PathBuf};

use ethers::signers::{LocalWallet, Signer};
use tracing::{debug, info};

use super::{Address, Keypair};
use crate::error::{Error, Result};

/// A sample v3 keystore (scrypt, n = 262144) for account
/// `0x657e61650a4902042e736b288ffe71fa3610b02a`, password `secret`.
pub const EXAMPLE_KEYSTORE: &str = r#"{"address":"657e61650a4902042e736b288ffe71fa3610b02a","crypto":{"cipher":"aes-128-ctr","ciphertext":"3b98d349bafef6e16120fd9198d35ec036552d035580dd18f446532b607439ca","cipherparams":{"iv":"06dae92c156ed069d9b015153211508d"},"kdf":"scrypt","kdfparams":{"dklen":32,"n":262144,"p":1,"r":8,"salt":"d4d050ace2d33a0423d5e1e5c6f07dbb39387161b22632d03b5ad011d553f8c2"},"mac":"4884a6192e26d16a6b0d32431be9d5ce56bd64d6392d29d090cba017b8c022e5"},"id":"efc09b9b-5d2b-46d3-aa7b-40570ea2104a","version":3}"#;

/// Creates a new random account and stores it encrypted in `dir`.
///
/// Returns the account address and the path of the keystore file.
pub fn create_keystore(dir: impl AsRef<Path>, password: &str) -> Result<(Address, PathBuf)> {
    let keypair = Keypair::generate();
    let path = write_keystore(dir.as_ref(), &keypair, password)?;

    info!(address = %keypair.address().to_checksum(), path = %path.display(), "keystore created");
    Ok((*keypair.address(), path))
}

/// Decrypts the keystore at `keystore_path` with `password` and stores it
/// again in `dir`, encrypted under `new_password`.
///
/// Fails with [`Error::AccountExists`] if `dir` already holds a keystore for
/// the same account.
pub fn import_keystore(
    keystore_path: impl AsRef<Path>,
    password: &str,
    new_password: &str,
    dir: impl AsRef<Path>,
) -> Result<(Address, PathBuf)> {
    let wallet = decrypt(keystore_path.as_ref(), password)?;
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&wallet.signer().to_bytes());
    let keypair = Keypair::from_secret_key(secret)?;

    let path = write_keystore(dir.as_ref(), &keypair, new_password)?;
    info!(address = %keypair.address().to_checksum(), path = %path.display(), "keystore imported");
    Ok((*keypair.address(), path))
}

/// Returns the keystore file in `dir` that belongs to `address`, if any.
///
/// Matches any file name containing the address hex, so both
/// `<address>.json` and `UTC--<time>--<address>` are found.
pub fn find_keystore(dir: impl AsRef<Path>, address: &Address) -> Result<Option<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(None);
    }

    let needle = address.to_hex();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.contains(&needle) {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

fn write_keystore(dir: &Path, keypair: &Keypair, password: &str) -> Result<PathBuf> {
    if let Some(existing) = find_keystore(dir, keypair.address())? {
        return Err(Error::AccountExists(format!(
            "{} ({})",
            keypair.address().to_checksum(),
            existing.display()
        )));
    }
    fs::create_dir_all(dir)?;

    let name = format!("{}.json", keypair.address().to_hex());
    LocalWallet::encrypt_keystore(
        dir,
        &mut rand::thread_rng(),
        keypair.private_key_bytes(),
        password,
        Some(&name),
    )
    .map_err(|e| Error::Keystore(e.to_string()))?;

    Ok(dir.join(name))
}

/// Decrypts a keystore file and returns its private key as hex (no prefix).
pub fn export_private_key(keystore_path: impl AsRef<Path>, password: &str) -> Result<String> {
    let wallet = decrypt(keystore_path.as_ref(), password)?;
    debug!(address = %Address::from(wallet.address()), "keystore unlocked");
    Ok(hex::encode(wallet.signer().to_bytes()))
}

/// Returns the only keystore file in `dir`.
///
/// Fails unless the directory holds exactly one file.
pub fn single_keystore(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }

    match files.len() {
        1 => Ok(files.remove(0)),
        n => Err(Error::Keystore(format!(
            "expected exactly one keystore in {}, found {}",
            dir.display(),
            n
        ))),
    }
}

fn decrypt(path: &Path, password: &str) -> Result<LocalWallet> {
    LocalWallet::decrypt_keystore(path, password)
        .map_err(|e| Error::Keystore(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_export() {
        let dir = tempfile::tempdir().unwrap();
        let (address, path) = create_keystore(dir.path(), "secret").unwrap();
        assert!(path.starts_with(dir.path()));

        let private_key = export_private_key(&path, "secret").unwrap();
        let keypair = Keypair::from_hex(&private_key).unwrap();
        assert_eq!(*keypair.address(), address);
    }

    #[test]
    fn test_import_reencrypts_under_new_password() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let (address, path) = create_keystore(source.path(), "old").unwrap();

        let (imported, imported_path) =
            import_keystore(&path, "old", "new", target.path()).unwrap();
        assert_eq!(imported, address);
        assert!(export_private_key(&imported_path, "old").is_err());
        assert_eq!(
            export_private_key(&imported_path, "new").unwrap(),
            export_private_key(&path, "old").unwrap()
        );
    }

    #[test]
    fn test_wrong_password() {
        let dir = tempfile::tempdir().unwrap();
        let (_, path) = create_keystore(dir.path(), "secret").unwrap();
        assert!(matches!(
            export_private_key(&path, "wrong"),
            Err(Error::Keystore(_))
        ));
    }

    #[test]
    fn test_single_keystore() {
        let dir = tempfile::tempdir().unwrap();
        assert!(single_keystore(dir.path()).is_err());

        let (_, path) = create_keystore(dir.path(), "secret").unwrap();
        assert_eq!(single_keystore(dir.path()).unwrap(), path);

        create_keystore(dir.path(), "secret").unwrap();
        assert!(matches!(single_keystore(dir.path()), Err(Error::Keystore(_))));
    }

    #[test]
    fn test_file_named_after_address() {
        let dir = tempfile::tempdir().unwrap();
        let (address, path) = create_keystore(dir.path(), "secret").unwrap();
        assert_eq!(path, dir.path().join(format!("{}.json", address.to_hex())));
        assert_eq!(find_keystore(dir.path(), &address).unwrap(), Some(path));
    }

    #[test]
    fn test_find_keystore_matches_geth_names() {
        let dir = tempfile::tempdir().unwrap();
        let address: Address = "0x657e61650a4902042e736b288ffe71fa3610b02a".parse().unwrap();
        let path = dir
            .path()
            .join("UTC--2018-03-17T19-41-30.123Z--657E61650A4902042E736B288FFE71FA3610B02A");
        fs::write(&path, EXAMPLE_KEYSTORE).unwrap();

        assert_eq!(find_keystore(dir.path(), &address).unwrap(), Some(path));
        assert_eq!(find_keystore(dir.path().join("missing"), &address).unwrap(), None);
    }

    #[test]
    fn test_import_same_account_twice_fails() {
        let source = tempfile::tempdir().unwrap();
        let target = tempfile::tempdir().unwrap();
        let (address, path) = create_keystore(source.path(), "old").unwrap();

        import_keystore(&path, "old", "new", target.path()).unwrap();
        assert!(matches!(
            import_keystore(&path, "old", "other", target.path()),
            Err(Error::AccountExists(_))
        ));

        let only = single_keystore(target.path()).unwrap();
        assert_eq!(find_keystore(target.path(), &address).unwrap(), Some(only));
    }

    #[test]
    fn test_created_keystore_uses_library_scrypt_cost() {
        let dir = tempfile::tempdir().unwrap();
        let (_, path) = create_keystore(dir.path(), "secret").unwrap();
        let json = fs::read_to_string(path).unwrap();
        assert!(json.contains(r#""kdf":"scrypt""#));
        assert!(json.contains(r#""n":8192"#));
    }
}
