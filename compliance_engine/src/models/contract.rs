use serde::{Deserialize, Serialize};

crate::define_id_type!(i64, ContractId);
crate::define_id_type!(i64, ProgramId);
crate::define_id_type!(i64, DerId);

/// Lifecycle state of an enrollment contract.
///
/// Only `Active` contracts are evaluated by the daily compliance run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractStatus {
    Active,
    Suspended,
    Terminated,
}

/// An enrollment contract binding a service provider's DERs to a program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: ContractId,
    pub program_id: ProgramId,
    pub status: ContractStatus,
}

impl Contract {
    pub fn is_active(&self) -> bool {
        self.status == ContractStatus::Active
    }
}
