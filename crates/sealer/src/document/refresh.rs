//! Fill generated defaults and seal secret node fields.
//!
//! Sealing is idempotent: a field that already opens under the document's
//! encryption settings is left as is, anything else is treated as plaintext
//! and encrypted. Running [`refresh`] twice produces no further changes.

use fieldcrypt::{CryptoError, EncryptionIdentity, Encryptor};
use thiserror::Error;
use tracing::{debug, info};

use super::model::{Db, Document, Encryption};
use crate::secrets;

/// Default cipher spec written when the document names none.
pub const DEFAULT_CIPHER_METHOD: &str = "AES-256-CBC";

/// Default downstream log level.
pub const DEFAULT_LOG_LEVEL: &str = "INFO";

const ENCRYPTION_STRING_LEN: usize = 48;
const DB_PASSWORD_LEN: usize = 32;
const DB_PORT: u16 = 5432;
const DB_NAME: &str = "app";

/// Errors produced by the refresh pass.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// A required field is absent or empty.
    #[error("please, fill {0}")]
    Missing(String),

    /// A plaintext field could not be sealed.
    #[error("encrypt {field}: {source}")]
    Seal {
        field: String,
        #[source]
        source: CryptoError,
    },
}

/// What a refresh pass changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RefreshReport {
    /// Fields that were plaintext and are now sealed.
    pub sealed: usize,
    /// Fields that were already sealed and left untouched.
    pub already_sealed: usize,
    /// Whether a key, salt, cipher method or database section was generated.
    pub generated_defaults: bool,
}

/// Validate `doc`, fill missing defaults and seal every secret node field.
///
/// # Errors
///
/// - [`DocumentError::Missing`] naming the first required field that is empty.
/// - [`DocumentError::Seal`] if encryption fails (e.g. an invalid
///   `CipherMethod`).
pub fn refresh(doc: &mut Document, db_host: &str) -> Result<RefreshReport, DocumentError> {
    let mut report = RefreshReport::default();

    let translator = &doc.utils.translator;
    require(&translator.host, "Utils.AsterizmTranslator.Host")?;
    require(&translator.api_key, "Utils.AsterizmTranslator.ApiKey")?;

    if doc.environment.log_level.is_empty() {
        doc.environment.log_level = DEFAULT_LOG_LEVEL.into();
    }

    let encryption = doc.utils.encryption.get_or_insert_with(|| Encryption {
        encrypt_payload: true,
        ..Encryption::default()
    });
    report.generated_defaults |= fill_encryption_defaults(encryption);

    if doc.utils.db.is_none() {
        info!(host = %db_host, "generating default database settings");
        doc.utils.db = Some(Db {
            host: db_host.into(),
            port: DB_PORT,
            name: DB_NAME.into(),
            user: DB_NAME.into(),
            password: secrets::generate_password(DB_PASSWORD_LEN),
        });
        report.generated_defaults = true;
    }

    if doc.nodes.list.is_empty() {
        return Err(DocumentError::Missing("Nodes.List".into()));
    }

    let encryptor = Encryptor::new(EncryptionIdentity::new(
        encryption.key.clone(),
        encryption.salt.clone(),
        encryption.cipher_method.clone(),
    ));

    for (name, node) in doc.nodes.list.iter_mut() {
        let path = |field: &str| format!("Nodes.List.{name}.{field}");

        require(&node.rpc, &path("RPC"))?;
        require(&node.chain_id, &path("ChainId"))?;
        require(&node.contract_address, &path("ContractAddress"))?;
        require(&node.owner_address, &path("OwnerAddress"))?;
        require(&node.owner_private_key, &path("OwnerPrivateKey"))?;

        seal(&encryptor, &mut node.owner_address, &path("OwnerAddress"), &mut report)?;
        seal(&encryptor, &mut node.owner_private_key, &path("OwnerPrivateKey"), &mut report)?;
        if !node.owner_public_key.is_empty() {
            seal(&encryptor, &mut node.owner_public_key, &path("OwnerPublicKey"), &mut report)?;
        }
    }

    Ok(report)
}

fn require(value: &str, path: &str) -> Result<(), DocumentError> {
    if value.is_empty() {
        return Err(DocumentError::Missing(path.to_owned()));
    }
    Ok(())
}

/// Returns `true` if anything was generated.
fn fill_encryption_defaults(encryption: &mut Encryption) -> bool {
    let mut generated = false;
    if encryption.key.is_empty() {
        encryption.key = secrets::generate_encryption_string(ENCRYPTION_STRING_LEN);
        generated = true;
    }
    if encryption.salt.is_empty() {
        encryption.salt = secrets::generate_encryption_string(ENCRYPTION_STRING_LEN);
        generated = true;
    }
    if encryption.cipher_method.is_empty() {
        encryption.cipher_method = DEFAULT_CIPHER_METHOD.into();
        generated = true;
    }
    if generated {
        info!("generated missing encryption settings");
    }
    generated
}

fn seal(
    encryptor: &Encryptor,
    value: &mut String,
    path: &str,
    report: &mut RefreshReport,
) -> Result<(), DocumentError> {
    if encryptor.is_sealed(value) {
        debug!(field = %path, "already sealed");
        report.already_sealed += 1;
        return Ok(());
    }

    *value = encryptor
        .encrypt_str(value)
        .map_err(|source| DocumentError::Seal {
            field: path.to_owned(),
            source,
        })?;
    debug!(field = %path, "sealed");
    report.sealed += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::model::{Node, Translator};

    fn node() -> Node {
        Node {
            rpc: "https://rpc.example".into(),
            chain_id: "1".into(),
            contract_address: "0xc0ffee".into(),
            owner_address: "0xabc".into(),
            owner_private_key: "0xdef".into(),
            ..Node::default()
        }
    }

    fn document() -> Document {
        let mut doc = Document::default();
        doc.utils.translator = Translator {
            host: "https://translator.example".into(),
            api_key: "abc".into(),
        };
        doc.nodes.list.insert("eth".into(), node());
        doc
    }

    fn encryptor_for(doc: &Document) -> Encryptor {
        let enc = doc.utils.encryption.as_ref().unwrap();
        Encryptor::new(EncryptionIdentity::new(
            enc.key.clone(),
            enc.salt.clone(),
            enc.cipher_method.clone(),
        ))
    }

    #[test]
    fn fills_defaults_and_seals_fields() {
        let mut doc = document();
        let report = refresh(&mut doc, "db-host").unwrap();

        assert_eq!(doc.environment.log_level, DEFAULT_LOG_LEVEL);
        let enc = doc.utils.encryption.as_ref().unwrap();
        assert!(enc.encrypt_payload);
        assert_eq!(enc.key.len(), ENCRYPTION_STRING_LEN);
        assert_eq!(enc.salt.len(), ENCRYPTION_STRING_LEN);
        assert_eq!(enc.cipher_method, DEFAULT_CIPHER_METHOD);

        let db = doc.utils.db.as_ref().unwrap();
        assert_eq!(db.host, "db-host");
        assert_eq!(db.port, DB_PORT);
        assert_eq!(db.password.len(), DB_PASSWORD_LEN);

        assert!(report.generated_defaults);
        assert_eq!(report.sealed, 2);
        assert_eq!(report.already_sealed, 0);

        let node = &doc.nodes.list["eth"];
        let enc = encryptor_for(&doc);
        assert_eq!(enc.decrypt_to_string(&node.owner_address).unwrap(), "0xabc");
        assert_eq!(enc.decrypt_to_string(&node.owner_private_key).unwrap(), "0xdef");
        assert!(node.owner_public_key.is_empty());
    }

    #[test]
    fn second_refresh_changes_nothing() {
        let mut doc = document();
        doc.nodes.list.get_mut("eth").unwrap().owner_public_key = "0x04aa".into();
        refresh(&mut doc, "db-host").unwrap();
        let once = doc.clone();

        let report = refresh(&mut doc, "db-host").unwrap();
        assert_eq!(doc, once);
        assert_eq!(report.sealed, 0);
        assert_eq!(report.already_sealed, 3);
        assert!(!report.generated_defaults);
    }

    #[test]
    fn keeps_existing_settings() {
        let mut doc = document();
        doc.environment.log_level = "DEBUG".into();
        doc.utils.encryption = Some(Encryption {
            encrypt_payload: false,
            key: "k".into(),
            salt: "s".into(),
            cipher_method: "aes-128-ofb".into(),
        });
        doc.utils.db = Some(Db {
            host: "external".into(),
            ..Db::default()
        });

        let report = refresh(&mut doc, "db-host").unwrap();
        assert!(!report.generated_defaults);
        assert_eq!(doc.environment.log_level, "DEBUG");
        assert_eq!(doc.utils.db.as_ref().unwrap().host, "external");
        let enc = doc.utils.encryption.as_ref().unwrap();
        assert!(!enc.encrypt_payload);
        assert_eq!(enc.key, "k");

        let sealed = &doc.nodes.list["eth"].owner_address;
        let opener = Encryptor::new(EncryptionIdentity::new("k", "s", "AES-128-OFB"));
        assert_eq!(opener.decrypt_to_string(sealed).unwrap(), "0xabc");
    }

    #[test]
    fn missing_translator_reported() {
        let mut doc = document();
        doc.utils.translator.api_key.clear();
        let err = refresh(&mut doc, "db-host").unwrap_err();
        assert_eq!(
            err.to_string(),
            "please, fill Utils.AsterizmTranslator.ApiKey"
        );
    }

    #[test]
    fn refreshes_document_in_existing_format() {
        let mut doc: Document = serde_yaml::from_str(
            r#"
Utils:
  AsterizmTranslator:
    Host: https://translator.example
    ApiKey: abc
Nodes:
  List:
    eth:
      RPC: https://rpc.example
      ChainId: "1"
      ContractAddress: "0xc0ffee"
      OwnerAddress: "0xabc"
      OwnerPrivateKey: "0xdef"
"#,
        )
        .unwrap();

        let report = refresh(&mut doc, "db-host").unwrap();
        assert_eq!(report.sealed, 2);
        assert_eq!(doc.utils.translator.api_key, "abc");

        let text = serde_yaml::to_string(&doc).unwrap();
        assert!(text.contains("AsterizmTranslator:"));
        assert!(text.contains("ApiKey: abc"));
    }

    #[test]
    fn empty_node_list_reported() {
        let mut doc = document();
        doc.nodes.list.clear();
        let err = refresh(&mut doc, "db-host").unwrap_err();
        assert_eq!(err.to_string(), "please, fill Nodes.List");
    }

    #[test]
    fn missing_node_field_names_path() {
        let mut doc = document();
        doc.nodes.list.get_mut("eth").unwrap().chain_id.clear();
        let err = refresh(&mut doc, "db-host").unwrap_err();
        assert_eq!(err.to_string(), "please, fill Nodes.List.eth.ChainId");
    }

    #[test]
    fn invalid_cipher_method_fails_sealing() {
        let mut doc = document();
        doc.utils.encryption = Some(Encryption {
            encrypt_payload: true,
            key: "k".into(),
            salt: "s".into(),
            cipher_method: "AES-128-GCM".into(),
        });
        let err = refresh(&mut doc, "db-host").unwrap_err();
        assert!(matches!(
            err,
            DocumentError::Seal {
                source: CryptoError::InvalidCipherFormat,
                ..
            }
        ));
    }
}
