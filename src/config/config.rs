use anyhow::bail;
use serde::{Deserialize, Serialize};

// Top level config constants.
pub const STORAGE_CLASS_SUB_SYS: &str = "storage_class";
pub const COMMENT_KEY: &str = "comment";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct KV {
    pub key: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq, Eq)]
pub struct KVS(pub Vec<KV>);

impl KVS {
    pub fn new() -> Self {
        KVS::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KV> {
        self.0.iter()
    }

    // Sets a key value pair.
    pub fn set(&mut self, key: String, value: String) {
        match self.0.iter_mut().find(|kv| kv.key == key) {
            Some(kv) => {
                kv.value = value;
            }
            None => self.0.push(KV { key, value }),
        }
    }

    pub fn get(&self, key: &str) -> &str {
        self.lookup(key).unwrap_or("")
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|&kv| kv.key == key)
            .map(|kv| kv.value.as_str())
    }
}


// Rejects keys the sub-system does not know about.
pub fn check_valid_keys(sub_sys: &str, kvs: &KVS, valid_kvs: &KVS) -> anyhow::Result<()> {
    let mut unknown = Vec::new();
    for kv in kvs.iter() {
        if kv.key == COMMENT_KEY {
            continue;
        }
        if valid_kvs.lookup(&kv.key).is_none() {
            unknown.push(kv.key.as_str());
        }
    }
    if !unknown.is_empty() {
        bail!(
            "found invalid keys ({}) for '{}' sub-system, use 'help {}' to list valid keys",
            unknown.join(","),
            sub_sys,
            sub_sys
        );
    }
    Ok(())
}
