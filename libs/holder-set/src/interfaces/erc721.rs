use alloy::sol;

sol! {
    /// Emitted on every mint, transfer and burn of an ERC-721 token.
    ///
    /// All three parameters are indexed, which is what distinguishes it from
    /// the ERC-20 `Transfer` event sharing the same signature hash.
    #[allow(missing_docs)]
    event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

    #[sol(rpc)]
    interface IERC721Enumerable {
        /// Number of tokens held by `owner`
        function balanceOf(address owner) external view returns (uint256);

        /// Current owner of `tokenId`
        function ownerOf(uint256 tokenId) external view returns (address);

        /// Total number of tokens tracked by the contract
        function totalSupply() external view returns (uint256);
    }
}
