use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    Unauthorized = 900,
    InvalidAsset = 901,
    Paused = 902,
    InvalidTiming = 903,
    NotFound = 904,
    PeriodConflict = 905,
    InsufficientBalance = 906,
    TransferFailed = 907,
    InvalidAmount = 908,
    ContractMathError = 909,
    OwnerNotSet = 910,
}
