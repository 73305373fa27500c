//! Vyoman token contract bindings.
//!
//! Vyoman is a plain ERC20 deployed with its whole initial supply minted to
//! the deployer, so the standard interface covers everything the client calls.

use alloy_sol_types::sol;

sol! {
    /// ERC20 interface exposed by the Vyoman token
    #[sol(rpc)]
    interface IVyoman {
        /// Emitted when tokens are transferred
        event Transfer(
            address indexed from,
            address indexed to,
            uint256 value
        );

        /// Get token balance of an account
        function balanceOf(address account) external view returns (uint256);

        /// Transfer tokens to recipient
        function transfer(address to, uint256 amount) external returns (bool);

        /// Get token name
        function name() external view returns (string memory);

        /// Get token symbol
        function symbol() external view returns (string memory);

        /// Get token decimals
        function decimals() external view returns (uint8);

        /// Get total supply
        function totalSupply() external view returns (uint256);
    }
}
