//! Contract interfaces used by the marketplace operations.

use alloy::sol;

sol! {
    /// Minimal ERC-721 surface: approvals and transfers.
    #[derive(Debug, PartialEq, Eq)]
    interface IERC721 {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);

        function approve(address to, uint256 tokenId) external;
        function getApproved(uint256 tokenId) external view returns (address);
        function isApprovedForAll(address owner, address operator) external view returns (bool);
        function ownerOf(uint256 tokenId) external view returns (address);
    }

    /// Marketplace holding listings, sales and bids.
    #[derive(Debug, PartialEq, Eq)]
    interface IMarketplace {
        event ItemListed(
            uint256 indexed listingId,
            address indexed seller,
            address indexed nftContract,
            uint256 tokenId,
            uint256 price
        );
        event ItemSold(uint256 indexed listingId, address indexed buyer, uint256 price);
        event BidPlaced(uint256 indexed listingId, address indexed bidder, uint256 amount);
        event ListingCancelled(uint256 indexed listingId);

        function listItem(address nftContract, uint256 tokenId, uint256 price, bool crossChain)
            external
            returns (uint256 listingId);
        function buyItem(uint256 listingId) external payable;
        function placeBid(uint256 listingId) external payable;
        function cancelListing(uint256 listingId) external;
        function acceptBid(uint256 listingId) external;
    }

    /// Creator collection supporting open minting.
    #[derive(Debug, PartialEq, Eq)]
    interface ICollection {
        function mint(address to, string tokenURI) external returns (uint256 tokenId);
    }

    /// Factory deploying creator collections.
    #[derive(Debug, PartialEq, Eq)]
    interface ICollectionFactory {
        event CollectionCreated(address indexed collection, address indexed creator, string name);

        function createCollection(
            string name,
            string symbol,
            uint256 maxSupply,
            uint256 royaltyBps,
            string baseURI
        ) external returns (address collection);
    }
}
