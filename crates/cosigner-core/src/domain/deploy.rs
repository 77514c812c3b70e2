//! # Deterministic Deployment
//!
//! Recognizes calls to the CREATE2 factory and predicts the address they
//! deploy to. The factory takes raw `salt ‖ initcode` as call data (no
//! selector), so the "selector" logged for it is the first four salt bytes.

use cosigner_types::{keccak256, Address, Bytes, Hash};

/// The keyless CREATE2 deployment proxy, present at the same address on
/// every supported network.
pub const CREATE2_FACTORY: Address = Address::new([
    0x4e, 0x59, 0xb4, 0x48, 0x47, 0xb3, 0x79, 0x57, 0x85, 0x88, 0x92, 0x0c, 0xa7, 0x8f, 0xbf, 0x26,
    0xc0, 0xb4, 0x95, 0x6c,
]);

/// True if `to` is the deterministic-deployment factory.
#[must_use]
pub fn is_factory(to: Address) -> bool {
    to == CREATE2_FACTORY
}

/// CREATE2 address: `keccak256(0xff ‖ deployer ‖ salt ‖ keccak256(init_code))[12..]`.
#[must_use]
pub fn create2_address(deployer: Address, salt: Hash, init_code: &[u8]) -> Address {
    let code_hash = keccak256(init_code);

    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(deployer.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(code_hash.as_bytes());

    let hash = keccak256(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash.0[12..32]);
    Address::new(addr)
}

/// A call to the factory, split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactoryCall {
    /// CREATE2 salt.
    pub salt: Hash,
    /// Contract creation code.
    pub init_code: Bytes,
}

impl FactoryCall {
    /// Splits factory call data; `None` if shorter than a salt.
    #[must_use]
    pub fn parse(data: &[u8]) -> Option<Self> {
        let salt = Hash::from_slice(data.get(..32)?)?;
        Some(Self {
            salt,
            init_code: Bytes::from_slice(&data[32..]),
        })
    }

    /// Address this call deploys to.
    #[must_use]
    pub fn predicted_address(&self) -> Address {
        create2_address(CREATE2_FACTORY, self.salt, self.init_code.as_slice())
    }

    /// Leading four bytes of the call data, for log correlation.
    #[must_use]
    pub fn selector(&self) -> [u8; 4] {
        [self.salt.0[0], self.salt.0[1], self.salt.0[2], self.salt.0[3]]
    }
}
