//! Generic transport trait and the store/send/delete state machines that
//! drive it.
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use crate::config::Config;
use crate::errors::{SmsError, StorageOpError, TransportError};
use crate::pdu::{encode_submit_pdu, SmsPart};

/// Enforce `timeout_secs` around a transport call regardless of whether
/// the backend honours the value it was given.
async fn bounded<T>(
    timeout_secs: u32,
    fut: impl Future<Output = Result<T, TransportError>>,
) -> Result<T, TransportError> {
    match tokio::time::timeout(Duration::from_secs(timeout_secs as u64), fut).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout),
    }
}

/// Modem-side memory bank a part physically resides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    Sm,
    Me,
    Mt,
    Sr,
    Bm,
    Ta,
    Unknown,
}

/// RAII guard for the advisory storage lock acquired before the first
/// transport call of a store/send/delete sequence.
pub struct StorageGuard {
    release: Option<tokio::sync::oneshot::Sender<()>>,
}

impl StorageGuard {
    pub fn new(release: tokio::sync::oneshot::Sender<()>) -> StorageGuard {
        StorageGuard { release: Some(release) }
    }
}

impl Drop for StorageGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.release.take() {
            let _ = tx.send(());
        }
    }
}

/// The capability a transport backend (AT/MBIM/QMI — all out of scope
/// here) must provide for the storage state machines below.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn write_part(&self, storage: Storage, pdu: &[u8], timeout_secs: u32) -> Result<u32, TransportError>;
    async fn send_part_by_index(&self, index: u32, timeout_secs: u32) -> Result<u8, TransportError>;
    async fn send_part_by_pdu(&self, pdu: &[u8], timeout_secs: u32) -> Result<u8, TransportError>;
    async fn delete_part(&self, index: u32, timeout_secs: u32) -> Result<(), TransportError>;
    async fn lock_storage(
        &self,
        mem1: Option<Storage>,
        mem2: Option<Storage>,
    ) -> Result<StorageGuard, TransportError>;
}

/// Store every part in `parts` to `storage`, in order, recording the
/// modem-assigned index on each part. Aborts on the first failure without
/// rolling back parts already written.
pub async fn store_parts<T: Transport + ?Sized>(
    transport: &T,
    storage: Storage,
    parts: &mut [SmsPart],
    cfg: &Config,
) -> Result<(), SmsError> {
    let _guard = transport.lock_storage(Some(storage), None).await?;
    for part in parts.iter_mut() {
        debug!("writing part to storage {:?}", storage);
        let (pdu, _) = encode_submit_pdu(part)?;
        let index = bounded(cfg.store_timeout_secs, transport.write_part(storage, &pdu, cfg.store_timeout_secs)).await?;
        part.storage_index = Some(index);
    }
    Ok(())
}

/// Send every part, preferring to reference an already-stored part by
/// index and falling back to sending a freshly-encoded PDU when that
/// fails for any reason other than a timeout.
pub async fn send_parts<T: Transport + ?Sized>(
    transport: &T,
    parts: &mut [SmsPart],
    cfg: &Config,
) -> Result<(), SmsError> {
    let _guard = transport.lock_storage(None, None).await?;
    for part in parts.iter_mut() {
        let reference = match part.storage_index {
            Some(index) => {
                let attempt = bounded(
                    cfg.send_timeout_secs,
                    transport.send_part_by_index(index, cfg.send_timeout_secs),
                )
                .await;
                match attempt {
                    Ok(r) => r,
                    Err(TransportError::Timeout) => return Err(SmsError::Transport(TransportError::Timeout)),
                    Err(e) => {
                        warn!("send by index failed ({}), falling back to fresh PDU", e);
                        let (pdu, _) = encode_submit_pdu(part)?;
                        bounded(cfg.send_timeout_secs, transport.send_part_by_pdu(&pdu, cfg.send_timeout_secs)).await?
                    }
                }
            }
            None => {
                let (pdu, _) = encode_submit_pdu(part)?;
                bounded(cfg.send_timeout_secs, transport.send_part_by_pdu(&pdu, cfg.send_timeout_secs)).await?
            }
        };
        part.message_reference = reference;
    }
    Ok(())
}

/// Delete every stored part, clearing `storage_index` unconditionally
/// (the modem may or may not still hold the slot, but in-memory state
/// must not claim it). Returns `Ok` iff every deletion succeeded,
/// otherwise an aggregate failure count.
pub async fn delete_parts<T: Transport + ?Sized>(
    transport: &T,
    parts: &mut [SmsPart],
    cfg: &Config,
) -> Result<(), SmsError> {
    let _guard = transport.lock_storage(None, None).await?;
    let mut failed = 0usize;
    let mut total = 0usize;
    for part in parts.iter_mut() {
        if let Some(index) = part.storage_index.take() {
            total += 1;
            if let Err(e) = bounded(cfg.delete_timeout_secs, transport.delete_part(index, cfg.delete_timeout_secs)).await {
                warn!("delete of part at index {} failed: {}", index, e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        return Err(SmsError::StorageOp(StorageOpError::PartialDelete { failed, total }));
    }
    Ok(())
}
