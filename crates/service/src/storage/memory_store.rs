use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use super::{KeyType, KvStore};
use crate::errors::ServiceError;

const WRONGTYPE: &str = "WRONGTYPE Operation against a key holding the wrong kind of value";

#[derive(Debug, Clone)]
enum Value {
    Str(String),
    List(Vec<String>),
    Hash(HashMap<String, String>),
}

/// In-process store with Redis-like semantics for the primitives in [`KvStore`].
///
/// Each key lives in one `DashMap` shard, so `incr` is atomic under the shard
/// lock the same way the server's INCR is.
#[derive(Default)]
pub struct MemoryStore {
    data: DashMap<String, Value>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    /// Make every subsequent call fail as if the server went away.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), ServiceError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ServiceError::Store("connection refused".into()));
        }
        Ok(())
    }
}

fn wrong_type() -> ServiceError { ServiceError::Store(WRONGTYPE.into()) }

/// Redis `KEYS` glob subset: `*` matches any run, `?` one character.
pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        match p.get(pi) {
            Some('*') => {
                star = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == '?' || c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match star {
                Some((sp, st)) => {
                    pi = sp + 1;
                    ti = st + 1;
                    star = Some((sp, st + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == '*')
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn ping(&self) -> Result<(), ServiceError> { self.check() }

    async fn incr(&self, key: &str) -> Result<i64, ServiceError> {
        self.check()?;
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Value::Str("0".into()));
        match entry.value_mut() {
            Value::Str(s) => {
                let n: i64 = s
                    .parse()
                    .map_err(|_| ServiceError::Store("ERR value is not an integer or out of range".into()))?;
                let next = n
                    .checked_add(1)
                    .ok_or_else(|| ServiceError::Store("ERR increment or decrement would overflow".into()))?;
                *s = next.to_string();
                Ok(next)
            }
            _ => Err(wrong_type()),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, ServiceError> {
        self.check()?;
        Ok(self.data.contains_key(key))
    }

    async fn key_type(&self, key: &str) -> Result<KeyType, ServiceError> {
        self.check()?;
        Ok(match self.data.get(key).as_deref() {
            None => KeyType::None,
            Some(Value::Str(_)) => KeyType::String,
            Some(Value::List(_)) => KeyType::List,
            Some(Value::Hash(_)) => KeyType::Hash,
        })
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, ServiceError> {
        self.check()?;
        Ok(self
            .data
            .iter()
            .filter(|e| glob_match(pattern, e.key()))
            .map(|e| e.key().clone())
            .collect())
    }

    async fn hset_multiple(&self, key: &str, fields: &[(&str, String)]) -> Result<(), ServiceError> {
        self.check()?;
        if fields.is_empty() {
            return Ok(());
        }
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Value::Hash(HashMap::new()));
        match entry.value_mut() {
            Value::Hash(h) => {
                for (f, v) in fields {
                    h.insert((*f).to_string(), v.clone());
                }
                Ok(())
            }
            _ => Err(wrong_type()),
        }
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, ServiceError> {
        self.check()?;
        match self.data.get(key).as_deref() {
            None => Ok(HashMap::new()),
            Some(Value::Hash(h)) => Ok(h.clone()),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn hget(&self, key: &str, field: &str) -> Result<Option<String>, ServiceError> {
        self.check()?;
        match self.data.get(key).as_deref() {
            None => Ok(None),
            Some(Value::Hash(h)) => Ok(h.get(field).cloned()),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<(), ServiceError> {
        self.check()?;
        let mut entry = self.data.entry(key.to_string()).or_insert_with(|| Value::List(Vec::new()));
        match entry.value_mut() {
            Value::List(l) => {
                l.push(value.to_string());
                Ok(())
            }
            _ => Err(wrong_type()),
        }
    }

    async fn lrange_all(&self, key: &str) -> Result<Vec<String>, ServiceError> {
        self.check()?;
        match self.data.get(key).as_deref() {
            None => Ok(Vec::new()),
            Some(Value::List(l)) => Ok(l.clone()),
            Some(_) => Err(wrong_type()),
        }
    }

    async fn del(&self, keys: &[String]) -> Result<(), ServiceError> {
        self.check()?;
        for key in keys {
            self.data.remove(key);
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), ServiceError> {
        self.set_unavailable(true);
        Ok(())
    }
}
