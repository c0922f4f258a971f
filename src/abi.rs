//! Bindings for the contracts the deployment scripts talk to, plus helpers
//! for read-only calls and for decoding events out of receipts by name.

use alloy_primitives::{Address, Bytes};
use alloy_sol_types::{sol, SolCall, SolEvent};

use crate::error::{DeployError, Result};
use crate::rpc::{ChainClient, TxReceipt};

sol! {
	#![sol(all_derives)]

	/// ERC-677 LINK token (a mock of it on the local chain).
	contract LinkToken {
		function transfer(address to, uint256 value) external returns (bool success);
	}

	/// Local stand-in for the Chainlink VRF coordinator.
	contract VRFCoordinatorMock {
		constructor(address linkToken);
		function callBackWithRandomness(bytes32 requestId, uint256 randomness, address consumerContract) external;
	}

	/// NFT whose image is an SVG uploaded at mint time.
	contract SVGNFT {
		function create(string svg) external;
		function tokenCounter() external view returns (uint256 count);
		function tokenURI(uint256 tokenId) external view returns (string uri);
	}

	/// NFT whose SVG is generated on-chain from VRF randomness.
	contract RandomSVG {
		constructor(address vrfCoordinator, address linkToken, bytes32 keyHash, uint256 fee);

		event requestedRandomSVG(bytes32 indexed requestId, uint256 indexed tokenId);

		function create() external returns (bytes32 requestId);
		function finishMint(uint256 tokenId) external;
		function tokenIdToRandomNumber(uint256 tokenId) external view returns (uint256 randomNumber);
		function tokenURI(uint256 tokenId) external view returns (string uri);
	}
}

/// Run a view call and decode its return values.
pub async fn view<C: SolCall>(client: &dyn ChainClient, to: Address, call: &C) -> Result<C::Return> {
	let out = client.call(to, Bytes::from(call.abi_encode())).await?;
	C::abi_decode_returns(&out, true)
		.map_err(|e| DeployError::Rpc(format!("decoding {} return: {e}", C::SIGNATURE)))
}

/// Find the first `E` event emitted by `emitter` in `receipt` and decode it.
///
/// Matching is by event signature and emitting address, never by position
/// in the log list, so unrelated logs (token transfers, coordinator
/// requests) can come and go without breaking the lookup.
pub fn decode_event<E: SolEvent>(receipt: &TxReceipt, emitter: Address) -> Result<E> {
	let log = receipt
		.logs
		.iter()
		.find(|log| log.address == emitter && log.topics.first() == Some(&E::SIGNATURE_HASH))
		.ok_or_else(|| {
			DeployError::EventParse(format!(
				"{} not emitted by {emitter} in {}",
				E::SIGNATURE,
				receipt.transaction_hash
			))
		})?;

	E::decode_raw_log(log.topics.iter().copied(), &log.data, true)
		.map_err(|e| DeployError::EventParse(format!("malformed {}: {e}", E::SIGNATURE)))
}
