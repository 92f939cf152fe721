//! Serde model of the YAML configuration document.
//!
//! Keys are PascalCase on disk (`Utils.Encryption.CipherMethod`,
//! `Nodes.List.<name>.OwnerPrivateKey`, ...). Only the keys modelled here
//! survive a load/store cycle; anything else in the file is dropped on
//! rewrite.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Document {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub utils: Utils,
    #[serde(default)]
    pub nodes: Nodes,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Environment {
    #[serde(default)]
    pub log_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Utils {
    #[serde(default)]
    pub encryption: Option<Encryption>,
    #[serde(default)]
    pub db: Option<Db>,
    #[serde(rename = "AsterizmTranslator", default)]
    pub translator: Translator,
}

/// Settings that build the field [`fieldcrypt::EncryptionIdentity`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Encryption {
    /// Whether the downstream service encrypts message payloads too.
    #[serde(default)]
    pub encrypt_payload: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub salt: String,
    /// Cipher spec string, e.g. `AES-256-CBC`.
    #[serde(default)]
    pub cipher_method: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Db {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Translator {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Nodes {
    #[serde(default)]
    pub force_order: bool,
    #[serde(default)]
    pub payload_struct: Vec<String>,
    #[serde(default)]
    pub list: BTreeMap<String, Node>,
}

/// One chain node. `OwnerAddress`, `OwnerPrivateKey` and `OwnerPublicKey`
/// are stored sealed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Node {
    #[serde(rename = "RPC", default)]
    pub rpc: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub contract_address: String,
    #[serde(default)]
    pub owner_address: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner_public_key: String,
    #[serde(default)]
    pub owner_private_key: String,
    #[serde(default, skip_serializing_if = "is_zero_i64")]
    pub max_resend_tries: i64,
    #[serde(default, skip_serializing_if = "is_zero_u64")]
    pub fee_multiplier_percent: u64,
}

fn is_zero_i64(v: &i64) -> bool {
    *v == 0
}

fn is_zero_u64(v: &u64) -> bool {
    *v == 0
}
