//! Identifier, hostname, port and path conventions
//!
//! Every document builder derives names through these functions. The
//! external toolchain joins the three documents by these strings, so a
//! formula must never be duplicated elsewhere.

/// Peer listen port inside its container
pub const PEER_LISTEN_PORT: u16 = 7051;
/// Orderer listen port inside its container
pub const ORDERER_LISTEN_PORT: u16 = 7050;
pub const CA_LISTEN_PORT: u16 = 7054;

/// Fixed peer template of the orchestration and cert-material documents
pub const PEERS_PER_ORG: usize = 2;
/// Host ports reserved per organization. Organizations beyond the tenth
/// collide with the next block; the formula is consumed downstream as-is.
pub const PORT_BLOCK_PER_ORG: u32 = 10;

pub const ORDERER_MSP_ID: &str = "OrdererMSP";

pub fn default_msp_id(org_name: &str) -> String {
    format!("{}MSP", org_name)
}

pub fn default_domain(org_name: &str) -> String {
    format!("{}.example.com", org_name.to_lowercase())
}

/// Lower-cased network name with whitespace runs collapsed to `-`.
///
/// Equal to plain lower-casing for single-word names; `Production Network`
/// becomes `production-network` rather than keeping the space, so every
/// orderer host is a valid DNS name.
pub fn network_slug(network_name: &str) -> String {
    network_name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn orderer_domain(network_name: &str) -> String {
    format!("{}.com", network_slug(network_name))
}

/// `orderer`, `orderer1`, `orderer2`, ...
pub fn orderer_hostname(index: usize) -> String {
    if index == 0 {
        "orderer".to_string()
    } else {
        format!("orderer{}", index)
    }
}

pub fn orderer_fqdn(index: usize, orderer_domain: &str) -> String {
    format!("{}.{}", orderer_hostname(index), orderer_domain)
}

pub fn orderer_endpoint(index: usize, orderer_domain: &str) -> String {
    format!("{}:{}", orderer_fqdn(index, orderer_domain), ORDERER_LISTEN_PORT)
}

pub fn peer_hostname(peer_index: usize, org_domain: &str) -> String {
    format!("peer{}.{}", peer_index, org_domain)
}

#[inline]
pub fn orderer_host_port(index: usize) -> u32 {
    ORDERER_LISTEN_PORT as u32 + index as u32
}

#[inline]
pub fn peer_host_port(org_index: usize, peer_index: usize) -> u32 {
    PEER_LISTEN_PORT as u32 + peer_index as u32 + org_index as u32 * PORT_BLOCK_PER_ORG
}

pub fn orderer_org_msp_dir(orderer_domain: &str) -> String {
    format!("crypto-config/ordererOrganizations/{}/msp", orderer_domain)
}

/// `crypto-config/ordererOrganizations/<domain>/orderers/<fqdn>`
pub fn orderer_crypto_dir(index: usize, orderer_domain: &str) -> String {
    format!(
        "crypto-config/ordererOrganizations/{}/orderers/{}",
        orderer_domain,
        orderer_fqdn(index, orderer_domain)
    )
}

pub fn orderer_tls_cert(index: usize, orderer_domain: &str) -> String {
    format!("{}/tls/server.crt", orderer_crypto_dir(index, orderer_domain))
}

pub fn peer_org_msp_dir(org_domain: &str) -> String {
    format!("crypto-config/peerOrganizations/{}/msp", org_domain)
}

/// `crypto-config/peerOrganizations/<domain>/peers/<peer host>`
pub fn peer_crypto_dir(peer_index: usize, org_domain: &str) -> String {
    format!(
        "crypto-config/peerOrganizations/{}/peers/{}",
        org_domain,
        peer_hostname(peer_index, org_domain)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orderer_hostnames() {
        assert_eq!(orderer_hostname(0), "orderer");
        assert_eq!(orderer_hostname(1), "orderer1");
        assert_eq!(orderer_hostname(2), "orderer2");
        assert_eq!(orderer_endpoint(1, "mynet.com"), "orderer1.mynet.com:7050");
    }

    #[test]
    fn test_network_slug() {
        assert_eq!(network_slug("Production Network"), "production-network");
        assert_eq!(network_slug("  my  Fabric\tnet "), "my-fabric-net");
        assert_eq!(orderer_domain("MyNet"), "mynet.com");
    }

    #[test]
    fn test_orderer_host_pattern() {
        // single word: exactly orderer<i>.<lower-cased name>.com
        assert_eq!(orderer_fqdn(0, &orderer_domain("MyNet")), "orderer.mynet.com");
        assert_eq!(orderer_fqdn(2, &orderer_domain("MyNet")), "orderer2.mynet.com");
        // several words: whitespace becomes '-' instead of staying in the host
        let multi = orderer_fqdn(1, &orderer_domain("Production Network"));
        assert_eq!(multi, "orderer1.production-network.com");
        assert!(!multi.contains(' '));
    }

    #[test]
    fn test_port_formula() {
        let ports: Vec<u32> = (0..3)
            .flat_map(|org| (0..PEERS_PER_ORG).map(move |peer| peer_host_port(org, peer)))
            .collect();
        assert_eq!(ports, vec![7051, 7052, 7061, 7062, 7071, 7072]);
        assert_eq!(orderer_host_port(0), 7050);
        assert_eq!(orderer_host_port(4), 7054);
    }

    #[test]
    fn test_peer_ports_stay_within_org_block() {
        let mut seen = std::collections::HashSet::new();
        for org in 0..12 {
            for peer in 0..PEERS_PER_ORG {
                let port = peer_host_port(org, peer);
                assert!(seen.insert(port));
                let block_start = 7051 + org as u32 * PORT_BLOCK_PER_ORG;
                assert!((block_start..block_start + PORT_BLOCK_PER_ORG).contains(&port));
            }
        }
    }

    #[test]
    fn test_orderer_ports_overlap_peer_range_known_limit() {
        // The formulas are consumed verbatim downstream: a second orderer
        // shares its host port with peer0 of the first organization, and
        // an eleventh organization starts at 7151.
        assert_eq!(orderer_host_port(1), peer_host_port(0, 0));
        assert_eq!(orderer_host_port(11), peer_host_port(1, 0));
        assert_eq!(peer_host_port(10, 0), 7151);
    }

    #[test]
    fn test_crypto_paths_agree_with_hostnames() {
        let dir = orderer_crypto_dir(1, "net.com");
        assert_eq!(dir, "crypto-config/ordererOrganizations/net.com/orderers/orderer1.net.com");
        assert!(orderer_tls_cert(1, "net.com").starts_with(&dir));
        assert_eq!(
            peer_crypto_dir(0, "org1.example.com"),
            "crypto-config/peerOrganizations/org1.example.com/peers/peer0.org1.example.com"
        );
    }
}
