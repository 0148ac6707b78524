use sha2::{Sha256, Digest};
use super::service::Service;

/// Feed each field length-prefixed so adjacent fields cannot run into each other
/// (aid 1 / iid 23 must not hash like aid 12 / iid 3).
fn update_field(hasher: &mut Sha256, field: &[u8]) {
    hasher.update((field.len() as u64).to_be_bytes());
    hasher.update(field);
}

/// Computes the stable SHA-256 identity of a service from its bridge username,
/// accessory id, service id, and native type.
pub fn service_identity(username: &str, aid: u64, iid: u64, service_type: &str) -> String {
    let mut hasher = Sha256::new();
    update_field(&mut hasher, username.as_bytes());
    update_field(&mut hasher, &aid.to_be_bytes());
    update_field(&mut hasher, &iid.to_be_bytes());
    update_field(&mut hasher, service_type.as_bytes());
    hex::encode(hasher.finalize())
}

/// Computes a SHA-256 fingerprint of the device set.
/// Services are sorted by identity so discovery order does not matter; only
/// fields that show up in a SYNC response contribute.
pub fn compute_fingerprint(services: &[Service]) -> String {
    let mut indices: Vec<usize> = (0..services.len()).collect();
    indices.sort_by(|&a, &b| services[a].identity.cmp(&services[b].identity));

    let mut hasher = Sha256::new();
    for &i in &indices {
        let s = &services[i];
        update_field(&mut hasher, s.identity.as_bytes());
        update_field(&mut hasher, s.display_name.as_bytes());
        update_field(&mut hasher, s.category.name().as_bytes());
        for c in &s.characteristics {
            update_field(&mut hasher, c.characteristic_type.as_bytes());
        }
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use rand::Rng;
    use crate::registry::service::tests::switch_service;

    #[test]
    fn test_identity_deterministic() {
        let a = service_identity("0E:3C:22:AA:10:5F", 2, 8, "00000049-0000-1000-8000-0026BB765291");
        let b = service_identity("0E:3C:22:AA:10:5F", 2, 8, "00000049-0000-1000-8000-0026BB765291");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_identity_fields_do_not_run_together() {
        assert_ne!(service_identity("AA", 1, 23, "49"), service_identity("AA", 12, 3, "49"));
        assert_ne!(service_identity("AA1", 2, 3, "49"), service_identity("AA", 12, 3, "49"));
    }

    #[test]
    fn test_identity_unique_over_random_corpus() {
        let mut rng = rand::thread_rng();
        let types = ["43", "49", "47", "4A", "8C"];
        let mut inputs = HashSet::new();
        let mut identities = HashSet::new();

        while inputs.len() < 20_000 {
            let username = format!("{:02X}:{:02X}:{:02X}", rng.gen::<u8>(), rng.gen::<u8>(), rng.gen::<u8>());
            let aid = rng.gen_range(1..200u64);
            let iid = rng.gen_range(1..200u64);
            let ty = types[rng.gen_range(0..types.len())];
            if inputs.insert((username.clone(), aid, iid, ty)) {
                identities.insert(service_identity(&username, aid, iid, ty));
            }
        }

        assert_eq!(identities.len(), inputs.len(), "identity collision");
    }

    #[test]
    fn test_fingerprint_ignores_order() {
        let a = switch_service();
        let mut b = switch_service();
        b.identity = "def".into();

        assert_eq!(
            compute_fingerprint(&[a.clone(), b.clone()]),
            compute_fingerprint(&[b, a])
        );
    }

    #[test]
    fn test_fingerprint_ignores_values() {
        let a = switch_service();
        let mut b = switch_service();
        b.characteristics[1].value = Some(serde_json::Value::Bool(true));

        assert_eq!(compute_fingerprint(&[a]), compute_fingerprint(&[b]));
    }

    #[test]
    fn test_fingerprint_changes_on_rename() {
        let a = switch_service();
        let mut b = switch_service();
        b.display_name = "Desk Lamp".into();

        assert_ne!(compute_fingerprint(&[a]), compute_fingerprint(&[b]));
    }
}
