//! Serial-keyed store of platform public keys.
//!
//! # Thread Safety
//!
//! The map sits behind a `RwLock`. Each write holds the lock only for the map
//! insert; no crypto work happens under it. Lock poisoning is reported as
//! [`WxPayError::Internal`] rather than panicking.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, FixedOffset, Utc};
use rsa::RsaPublicKey;

use crate::crypto::keys::decode_public_key;
use crate::crypto::verify_signature;
use crate::{Result, WxPayError};

/// A gateway public key and its validity window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformCertificate {
    /// Serial number, the store key.
    pub serial_no: String,
    /// Start of validity, when known.
    pub effective_time: Option<DateTime<FixedOffset>>,
    /// End of validity, when known.
    pub expire_time: Option<DateTime<FixedOffset>>,
    /// PEM the key was decoded from (certificate or bare public key).
    pub public_key_pem: String,
    /// Decoded RSA public key.
    pub public_key: RsaPublicKey,
}

impl PlatformCertificate {
    /// Decode a certificate or public key PEM under `serial_no`.
    pub fn from_pem(serial_no: impl Into<String>, pem: impl Into<String>) -> Result<Self> {
        let serial_no = serial_no.into();
        if serial_no.trim().is_empty() {
            return Err(WxPayError::invalid_data("serial_no", "missing"));
        }
        let public_key_pem = pem.into();
        let public_key = decode_public_key(&public_key_pem)?;
        Ok(Self {
            serial_no,
            effective_time: None,
            expire_time: None,
            public_key_pem,
            public_key,
        })
    }

    /// Attach the validity window reported by the gateway.
    pub fn with_validity(
        mut self,
        effective_time: Option<DateTime<FixedOffset>>,
        expire_time: Option<DateTime<FixedOffset>>,
    ) -> Self {
        self.effective_time = effective_time;
        self.expire_time = expire_time;
        self
    }

    /// Whether `now` is at or past the expiry time. Unknown expiry never expires.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expire_time.is_some_and(|expire| now >= expire)
    }

    /// Whether `now` lies inside the validity window.
    pub fn is_effective_at(&self, now: DateTime<Utc>) -> bool {
        self.effective_time.map_or(true, |effective| now >= effective) && !self.is_expired_at(now)
    }

    /// Check a Base64 signature over `message` with this key.
    pub fn verify(&self, message: &[u8], signature_b64: &str) -> bool {
        verify_signature(message, signature_b64, &self.public_key)
    }
}

/// Thread-safe map from serial number to [`PlatformCertificate`].
///
/// A later `put` for the same serial replaces the earlier one. Nothing is
/// evicted on expiry; check [`PlatformCertificate::is_expired_at`] on read if
/// freshness matters.
#[derive(Debug, Default)]
pub struct CertificateStore {
    certificates: RwLock<HashMap<String, Arc<PlatformCertificate>>>,
}

fn lock_error(context: &str) -> WxPayError {
    WxPayError::Internal(format!("CertificateStore: lock poisoned during {context}"))
}

impl CertificateStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a certificate under its serial number, replacing any previous one.
    pub fn put(&self, certificate: PlatformCertificate) -> Result<()> {
        let certificate = Arc::new(certificate);
        let mut certificates = self.certificates.write().map_err(|_| lock_error("put"))?;
        certificates.insert(certificate.serial_no.clone(), certificate);
        Ok(())
    }

    /// Look up a certificate by serial number.
    pub fn get(&self, serial_no: &str) -> Result<Option<Arc<PlatformCertificate>>> {
        let certificates = self.certificates.read().map_err(|_| lock_error("get"))?;
        Ok(certificates.get(serial_no).cloned())
    }

    /// Provision a certificate out-of-band instead of fetching it.
    ///
    /// `pem` may be an X.509 certificate or a bare public key. Seeded entries
    /// carry no validity window.
    pub fn seed(&self, pem: &str, serial_no: &str) -> Result<()> {
        self.put(PlatformCertificate::from_pem(serial_no, pem)?)
    }

    /// Move every entry of `batch` into this store under one write lock.
    ///
    /// Readers see either none or all of the batch.
    pub fn publish(&self, batch: CertificateStore) -> Result<()> {
        let incoming = batch
            .certificates
            .into_inner()
            .map_err(|_| lock_error("publish"))?;
        let mut certificates = self
            .certificates
            .write()
            .map_err(|_| lock_error("publish"))?;
        certificates.extend(incoming);
        Ok(())
    }

    /// The certificate that became effective last.
    ///
    /// Sensitive request fields must be encrypted with this one. Entries
    /// without an effective time sort first.
    pub fn latest(&self) -> Result<Option<Arc<PlatformCertificate>>> {
        let certificates = self.certificates.read().map_err(|_| lock_error("latest"))?;
        Ok(certificates
            .values()
            .max_by(|a, b| {
                a.effective_time
                    .cmp(&b.effective_time)
                    .then_with(|| a.serial_no.cmp(&b.serial_no))
            })
            .cloned())
    }

    /// Sorted serial numbers currently stored.
    pub fn serial_numbers(&self) -> Result<Vec<String>> {
        let certificates = self
            .certificates
            .read()
            .map_err(|_| lock_error("serial_numbers"))?;
        let mut serials: Vec<String> = certificates.keys().cloned().collect();
        serials.sort();
        Ok(serials)
    }

    /// Copy of the store at this point in time.
    pub fn snapshot(&self) -> Result<CertificateStore> {
        let certificates = self
            .certificates
            .read()
            .map_err(|_| lock_error("snapshot"))?;
        Ok(Self {
            certificates: RwLock::new(certificates.clone()),
        })
    }

    /// Number of stored certificates.
    pub fn len(&self) -> Result<usize> {
        let certificates = self.certificates.read().map_err(|_| lock_error("len"))?;
        Ok(certificates.len())
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> Result<bool> {
        let certificates = self
            .certificates
            .read()
            .map_err(|_| lock_error("is_empty"))?;
        Ok(certificates.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::fixtures;
    use chrono::TimeZone;

    fn cert_a() -> PlatformCertificate {
        PlatformCertificate::from_pem(fixtures::PLATFORM_A_SERIAL, fixtures::PLATFORM_A_CERT_PEM)
            .unwrap()
    }

    fn cert_b() -> PlatformCertificate {
        PlatformCertificate::from_pem(fixtures::PLATFORM_B_SERIAL, fixtures::PLATFORM_B_CERT_PEM)
            .unwrap()
    }

    fn at(rfc3339: &str) -> Option<DateTime<FixedOffset>> {
        Some(DateTime::parse_from_rfc3339(rfc3339).unwrap())
    }

    #[test]
    fn test_put_and_get() {
        let store = CertificateStore::new();
        assert!(store.is_empty().unwrap());
        store.put(cert_a()).unwrap();

        let found = store.get(fixtures::PLATFORM_A_SERIAL).unwrap().unwrap();
        assert_eq!(found.serial_no, fixtures::PLATFORM_A_SERIAL);
        assert!(store.get("UNKNOWN").unwrap().is_none());
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_put_overwrites_same_serial() {
        let store = CertificateStore::new();
        store.put(cert_a()).unwrap();

        let replacement = PlatformCertificate::from_pem(
            fixtures::PLATFORM_A_SERIAL,
            fixtures::PLATFORM_B_CERT_PEM,
        )
        .unwrap();
        store.put(replacement).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        let found = store.get(fixtures::PLATFORM_A_SERIAL).unwrap().unwrap();
        assert_eq!(found.public_key, cert_b().public_key);
    }

    #[test]
    fn test_seed_accepts_certificate_and_public_key() {
        let store = CertificateStore::new();
        store
            .seed(fixtures::PLATFORM_A_CERT_PEM, fixtures::PLATFORM_A_SERIAL)
            .unwrap();
        store.seed(fixtures::PLATFORM_A_PUBLIC_PEM, "PUB_KEY_ID_01").unwrap();

        let from_cert = store.get(fixtures::PLATFORM_A_SERIAL).unwrap().unwrap();
        let from_key = store.get("PUB_KEY_ID_01").unwrap().unwrap();
        assert_eq!(from_cert.public_key, from_key.public_key);
        assert!(from_cert.effective_time.is_none());
    }

    #[test]
    fn test_seed_rejects_bad_input() {
        let store = CertificateStore::new();
        assert!(store.seed("garbage", "S1").is_err());
        assert!(store.seed(fixtures::PLATFORM_A_CERT_PEM, "").is_err());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_latest_by_effective_time() {
        let store = CertificateStore::new();
        assert!(store.latest().unwrap().is_none());

        store
            .put(cert_a().with_validity(at("2024-01-01T00:00:00+08:00"), at("2029-01-01T00:00:00+08:00")))
            .unwrap();
        store
            .put(cert_b().with_validity(at("2025-06-01T00:00:00+08:00"), at("2030-06-01T00:00:00+08:00")))
            .unwrap();

        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.serial_no, fixtures::PLATFORM_B_SERIAL);
    }

    #[test]
    fn test_expiry_helpers() {
        let cert = cert_a().with_validity(
            at("2024-01-01T00:00:00+08:00"),
            at("2029-01-01T00:00:00+08:00"),
        );
        let before = Utc.with_ymd_and_hms(2023, 6, 1, 0, 0, 0).unwrap();
        let during = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2029, 6, 1, 0, 0, 0).unwrap();

        assert!(!cert.is_effective_at(before));
        assert!(cert.is_effective_at(during));
        assert!(!cert.is_expired_at(during));
        assert!(cert.is_expired_at(after));
        assert!(!cert.is_effective_at(after));

        // No metadata: always effective.
        assert!(cert_a().is_effective_at(after));
    }

    #[test]
    fn test_publish_is_all_or_nothing_for_readers() {
        let shared = CertificateStore::new();
        shared.put(cert_a()).unwrap();

        let batch = CertificateStore::new();
        batch.put(cert_b()).unwrap();
        shared.publish(batch).unwrap();

        assert_eq!(
            shared.serial_numbers().unwrap(),
            vec![
                fixtures::PLATFORM_B_SERIAL.to_string(),
                fixtures::PLATFORM_A_SERIAL.to_string()
            ]
        );
    }

    #[test]
    fn test_snapshot_is_independent() {
        let store = CertificateStore::new();
        store.put(cert_a()).unwrap();
        let snapshot = store.snapshot().unwrap();
        store.put(cert_b()).unwrap();
        assert_eq!(snapshot.len().unwrap(), 1);
        assert_eq!(store.len().unwrap(), 2);
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(CertificateStore::new());
        let template = cert_a();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                let mut cert = template.clone();
                cert.serial_no = format!("SERIAL{i:02}");
                std::thread::spawn(move || store.put(cert).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len().unwrap(), 16);
    }

    #[test]
    fn test_poisoned_lock_is_an_error() {
        let store = Arc::new(CertificateStore::new());
        store.put(cert_a()).unwrap();

        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.certificates.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(WxPayError::Internal(_))));
        assert!(matches!(store.is_empty(), Err(WxPayError::Internal(_))));
        assert!(matches!(
            store.get(fixtures::PLATFORM_A_SERIAL),
            Err(WxPayError::Internal(_))
        ));
    }
}
