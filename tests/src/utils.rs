use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Mutex;

use asnrecon_common::network::range::RangeSpec;
use asnrecon_core::pool::{AddressSource, Claim, IpPool};
use asnrecon_core::prober::CertificateProber;
use asnrecon_core::sink::{Discovery, ResultSink};
use async_trait::async_trait;

pub fn ranges(descriptors: &[&str]) -> Vec<RangeSpec> {
    descriptors.iter().map(|d| d.parse().unwrap()).collect()
}

pub fn pool(descriptors: &[&str]) -> IpPool {
    IpPool::new(ranges(descriptors)).unwrap()
}

pub fn drain(source: &dyn AddressSource) -> Vec<Ipv4Addr> {
    let mut out = Vec::new();
    while let Claim::Address(claim) = source.claim_next() {
        out.push(claim.address);
    }
    out
}

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

/// What a scripted probe should do for one address.
#[derive(Clone)]
pub enum Scripted {
    Name(&'static str),
    Fail(&'static str),
}

/// Prober answering from a script; unscripted addresses have no TLS service.
#[derive(Default)]
pub struct ScriptedProber {
    script: HashMap<Ipv4Addr, Scripted>,
    pub probed: Mutex<Vec<Ipv4Addr>>,
}

impl ScriptedProber {
    pub fn new(script: &[(&str, Scripted)]) -> Self {
        Self {
            script: script.iter().map(|(addr, s)| (ip(addr), s.clone())).collect(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn probed(&self) -> Vec<Ipv4Addr> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl CertificateProber for ScriptedProber {
    async fn probe(&self, addr: Ipv4Addr) -> anyhow::Result<Option<String>> {
        self.probed.lock().unwrap().push(addr);
        match self.script.get(&addr) {
            Some(Scripted::Name(name)) => Ok(Some(name.to_string())),
            Some(Scripted::Fail(reason)) => anyhow::bail!("{reason}"),
            None => Ok(None),
        }
    }
}

#[derive(Default)]
pub struct CountingSink {
    pub records: Mutex<Vec<(String, Discovery)>>,
}

#[async_trait]
impl ResultSink for CountingSink {
    async fn append(&self, key: &str, record: &Discovery) -> anyhow::Result<()> {
        self.records.lock().unwrap().push((key.to_string(), record.clone()));
        Ok(())
    }
}

pub fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("asnrecon-it-{}-{name}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
