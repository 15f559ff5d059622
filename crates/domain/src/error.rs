//! Error taxonomy shared by every component of the network.

use thiserror::Error;

/// Errors produced by the pool collections, the network token pool, the
/// router and their collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Caller is not allowed to perform the operation.
    #[error("access denied")]
    AccessDenied,

    /// A zero or otherwise unusable address was supplied.
    #[error("invalid address")]
    InvalidAddress,

    /// A rate with a zero denominator was supplied.
    #[error("invalid rate")]
    InvalidRate,

    /// A fee above the PPM resolution was supplied.
    #[error("invalid fee")]
    InvalidFee,

    /// The source/target pair cannot be traded through a single pool.
    #[error("invalid pool")]
    InvalidPool,

    /// The token cannot be used in this position (e.g. source equals target).
    #[error("invalid token")]
    InvalidToken,

    /// A pool for this token has already been created.
    #[error("pool already exists")]
    PoolAlreadyExists,

    /// No pool exists for this token.
    #[error("pool does not exist")]
    PoolDoesNotExist,

    /// The token is not whitelisted by the network settings.
    #[error("pool is not whitelisted")]
    PoolNotWhitelisted,

    /// The pool collection is already registered.
    #[error("pool collection already exists")]
    CollectionAlreadyExists,

    /// The pool collection is not registered.
    #[error("pool collection does not exist")]
    CollectionDoesNotExist,

    /// The pool collection still manages pools.
    #[error("pool collection is not empty")]
    CollectionIsNotEmpty,

    /// The candidate pool collection has a different pool type.
    #[error("wrong pool collection type")]
    WrongCollectionType,

    /// Network liquidity is not enabled for the pool.
    #[error("network liquidity is disabled")]
    NetworkLiquidityDisabled,

    /// The operation deadline has passed.
    #[error("deadline expired")]
    ExpiredDeadline,

    /// The attached native value does not match the requested amount.
    #[error("native amount mismatch")]
    EthAmountMismatch,

    /// Permits cannot be used with the native token.
    #[error("permit is not supported for this token")]
    PermitUnsupported,

    /// No pool collection handles this token.
    #[error("unsupported token")]
    UnsupportedToken,

    /// No pool collection is registered for this pool type.
    #[error("unsupported pool type {0}")]
    UnsupportedType(u16),

    /// Amount must be greater than zero.
    #[error("zero value")]
    ZeroValue,

    /// Deposit would push the staked balance above the pool's deposit limit.
    #[error("deposit limit exceeded")]
    DepositLimitExceeded,

    /// Trading liquidity cannot be bootstrapped without an initial rate.
    #[error("initial rate is not set")]
    NoInitialRate,

    /// Not enough trading liquidity to price or execute the trade.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// Trade output is below the requested minimum.
    #[error("return amount too low")]
    ReturnAmountTooLow,

    /// Requested network liquidity is above the pool's minting limit.
    #[error("minting limit exceeded")]
    MintingLimitExceeded,

    /// Account balance is too low for the transfer.
    #[error("insufficient balance")]
    InsufficientBalance,

    /// Spender allowance is too low for the transfer.
    #[error("insufficient allowance")]
    InsufficientAllowance,

    /// No withdrawal request with this id.
    #[error("unknown withdrawal request {0}")]
    UnknownWithdrawalRequest(u64),

    /// Withdrawal request is still within its lock period.
    #[error("withdrawal request {0} is still locked")]
    WithdrawalLocked(u64),

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// An entry point was entered while another one was still running.
    #[error("reentrancy detected")]
    Reentrancy,
}

/// Result type used across the network crates.
pub type NetworkResult<T> = Result<T, NetworkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(NetworkError::AccessDenied.to_string(), "access denied");
        assert_eq!(
            NetworkError::UnsupportedType(7).to_string(),
            "unsupported pool type 7"
        );
        assert_eq!(
            NetworkError::WithdrawalLocked(3).to_string(),
            "withdrawal request 3 is still locked"
        );
    }
}
