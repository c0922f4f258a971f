//! In-memory chain that executes just enough of the NFT, LINK and VRF mock
//! contracts for the deployment scripts to run end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::{address, keccak256, Address, Bytes, TxKind, B256, U256};
use alloy_sol_types::{SolEvent, SolInterface, SolValue};
use tokio_util::sync::CancellationToken;

use nft_deploy::abi::{LinkToken, RandomSVG, VRFCoordinatorMock, SVGNFT};
use nft_deploy::context::{DeployContext, RunSettings};
use nft_deploy::error::{DeployError, Result};
use nft_deploy::fulfillment::FulfillmentWaiter;
use nft_deploy::networks::NetworkConfigTable;
use nft_deploy::rpc::{ChainClient, Log, TxReceipt};
use nft_deploy::tx::ConfirmationPolicy;

pub const DEPLOYER: Address = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
pub const RINKEBY_LINK: Address = address!("01BE23585060835E02B77ef475b0Cc51aA1e0709");
pub const RINKEBY_VRF: Address = address!("b3dCcb4Cf7a26f6cf6B120Cf5A73875B7BBc655B");

/// Creation code markers written into the test artifacts.  The simulated
/// chain reads the first byte to know what is being deployed.
const LINK_CODE: u8 = 0x01;
const VRF_CODE: u8 = 0x02;
const SVG_CODE: u8 = 0x03;
const RANDOM_SVG_CODE: u8 = 0x04;

pub const SVG: &str = "<svg xmlns='http://www.w3.org/2000/svg' height='210' width='400'><path d='M150 0 L75 200 L225 200 Z' /></svg>";

#[derive(Debug, Clone)]
pub enum Contract {
	LinkToken {
		balances: HashMap<Address, U256>,
	},
	VrfCoordinator {
		link: Address,
	},
	SvgNft {
		uris: Vec<String>,
	},
	RandomSvg {
		vrf: Address,
		link: Address,
		key_hash: B256,
		fee: U256,
		counter: U256,
		requests: HashMap<B256, U256>,
		random: HashMap<U256, U256>,
		uris: HashMap<U256, String>,
	},
}

#[derive(Default)]
struct State {
	block: u64,
	nonce: u64,
	contracts: HashMap<Address, Contract>,
	reverting: Vec<[u8; 4]>,
	silenced: Vec<[u8; 4]>,
	deployed: Vec<(u8, Address)>,
	sent: Vec<TransactionRequest>,
}

pub struct SimulatedChain {
	chain_id: u64,
	state: Mutex<State>,
}

type Exec = std::result::Result<(Option<Address>, Vec<Log>), String>;

impl SimulatedChain {
	pub fn new(chain_id: u64) -> Arc<Self> {
		Arc::new(Self {
			chain_id,
			state: Mutex::new(State::default()),
		})
	}

	/// A live-network stand-in with the real LINK and coordinator addresses
	/// already populated and the deployer holding LINK.
	pub fn rinkeby() -> Arc<Self> {
		let chain = Self::new(4);
		chain.install(
			RINKEBY_LINK,
			Contract::LinkToken {
				balances: HashMap::from([(DEPLOYER, U256::from(10u128.pow(21)))]),
			},
		);
		chain.install(RINKEBY_VRF, Contract::VrfCoordinator { link: RINKEBY_LINK });
		chain
	}

	pub fn install(&self, at: Address, contract: Contract) {
		self.state.lock().unwrap().contracts.insert(at, contract);
	}

	/// Make every future call with this selector revert.
	pub fn revert_selector(&self, selector: [u8; 4]) {
		self.state.lock().unwrap().reverting.push(selector);
	}

	/// Drop every log from receipts of calls with this selector.
	pub fn silence_logs(&self, selector: [u8; 4]) {
		self.state.lock().unwrap().silenced.push(selector);
	}

	/// How many transactions were sent with this selector.
	pub fn sent_with(&self, selector: [u8; 4]) -> usize {
		self.state
			.lock()
			.unwrap()
			.sent
			.iter()
			.filter(|tx| selector_of(tx) == Some(selector))
			.count()
	}

	/// The last transaction sent with this selector.
	pub fn last_sent(&self, selector: [u8; 4]) -> Option<TransactionRequest> {
		self.state
			.lock()
			.unwrap()
			.sent
			.iter()
			.rev()
			.find(|tx| selector_of(tx) == Some(selector))
			.cloned()
	}

	/// Number of contracts deployed through transactions.
	pub fn deployments(&self) -> usize {
		self.state.lock().unwrap().deployed.len()
	}

	pub fn contract(&self, at: Address) -> Option<Contract> {
		self.state.lock().unwrap().contracts.get(&at).cloned()
	}

	pub fn link_balance(&self, token: Address, holder: Address) -> U256 {
		match self.contract(token) {
			Some(Contract::LinkToken { balances }) => balances.get(&holder).copied().unwrap_or_default(),
			_ => U256::ZERO,
		}
	}

	/// What the off-chain oracle does on a live network.
	pub fn fulfill(&self, consumer: Address, token_id: U256, randomness: U256) {
		let mut state = self.state.lock().unwrap();
		if let Some(Contract::RandomSvg { random, .. }) = state.contracts.get_mut(&consumer) {
			random.insert(token_id, randomness);
		}
	}

	fn execute(state: &mut State, tx: &TransactionRequest) -> Exec {
		let from = tx.from.unwrap_or_default();
		let data = input_of(tx);
		let Some(TxKind::Call(to)) = tx.to else {
			return Self::create(state, from, &data);
		};
		if selector_of(tx).is_some_and(|sel| state.reverting.contains(&sel)) {
			return Err("forced revert".into());
		}

		let contract = state
			.contracts
			.get(&to)
			.cloned()
			.ok_or_else(|| format!("no contract at {to}"))?;

		match contract {
			Contract::LinkToken { .. } => {
				let LinkToken::LinkTokenCalls::transfer(call) =
					LinkToken::LinkTokenCalls::abi_decode(&data, true).map_err(|e| e.to_string())?;
				Self::move_link(state, to, from, call.to, call.value)?;
				Ok((None, vec![transfer_log(to, from, call.to, call.value)]))
			}
			Contract::VrfCoordinator { .. } => {
				let VRFCoordinatorMock::VRFCoordinatorMockCalls::callBackWithRandomness(call) =
					VRFCoordinatorMock::VRFCoordinatorMockCalls::abi_decode(&data, true)
						.map_err(|e| e.to_string())?;
				let Some(Contract::RandomSvg { requests, random, .. }) =
					state.contracts.get_mut(&call.consumerContract)
				else {
					return Err("consumer is not a RandomSVG".into());
				};
				let token_id = *requests
					.get(&call.requestId)
					.ok_or_else(|| "unknown request id".to_string())?;
				random.insert(token_id, call.randomness);
				Ok((None, Vec::new()))
			}
			Contract::SvgNft { .. } => {
				let SVGNFT::SVGNFTCalls::create(call) =
					SVGNFT::SVGNFTCalls::abi_decode(&data, true).map_err(|e| e.to_string())?
				else {
					return Err("unsupported SVGNFT call".into());
				};
				let Some(Contract::SvgNft { uris }) = state.contracts.get_mut(&to) else {
					unreachable!()
				};
				uris.push(token_uri(&call.svg));
				Ok((None, Vec::new()))
			}
			Contract::RandomSvg { .. } => Self::random_svg(state, to, &data),
		}
	}

	fn random_svg(state: &mut State, at: Address, data: &[u8]) -> Exec {
		let call = RandomSVG::RandomSVGCalls::abi_decode(data, true).map_err(|e| e.to_string())?;
		let Some(Contract::RandomSvg {
			vrf,
			link,
			key_hash,
			fee,
			..
		}) = state.contracts.get(&at).cloned()
		else {
			unreachable!()
		};

		match call {
			RandomSVG::RandomSVGCalls::create(_) => {
				let Some(Contract::RandomSvg {
					counter, requests, ..
				}) = state.contracts.get_mut(&at)
				else {
					unreachable!()
				};
				let token_id = *counter;
				*counter += U256::from(1);
				let request_id = keccak256((key_hash, token_id).abi_encode());
				requests.insert(request_id, token_id);

				let coordinator_log = Log {
					address: vrf,
					topics: vec![
						keccak256("RandomnessRequest(address,bytes32,uint256)"),
						at.into_word(),
						key_hash,
					],
					data: Bytes::from(U256::from(98765).to_be_bytes::<32>().to_vec()),
				};
				let requested = RandomSVG::requestedRandomSVG {
					requestId: request_id,
					tokenId: token_id,
				};
				Ok((
					None,
					vec![
						transfer_log(link, at, vrf, fee),
						transfer_log(link, at, vrf, fee),
						coordinator_log,
						event_log(at, &requested),
					],
				))
			}
			RandomSVG::RandomSVGCalls::finishMint(call) => {
				let Some(Contract::RandomSvg { random, uris, .. }) = state.contracts.get_mut(&at)
				else {
					unreachable!()
				};
				let randomness = random.get(&call.tokenId).copied().unwrap_or_default();
				if randomness.is_zero() {
					return Err("random number not yet fulfilled".into());
				}
				uris.insert(call.tokenId, token_uri(&format!("<svg data-seed='{randomness}'/>")));
				Ok((None, Vec::new()))
			}
			_ => Err("view function sent as transaction".into()),
		}
	}

	fn create(state: &mut State, from: Address, data: &[u8]) -> Exec {
		state.nonce += 1;
		let mut raw = [0u8; 20];
		raw[0] = 0xc0;
		raw[12..].copy_from_slice(&state.nonce.to_be_bytes());
		let at = Address::from(raw);

		let code = data.first().copied().ok_or("empty creation code")?;
		let args = &data[1..];

		let contract = match code {
			LINK_CODE => Contract::LinkToken {
				balances: HashMap::from([(from, U256::from(10u128.pow(27)))]),
			},
			VRF_CODE => Contract::VrfCoordinator {
				link: Address::from_slice(&word(args, 0)?[12..]),
			},
			SVG_CODE => Contract::SvgNft { uris: Vec::new() },
			RANDOM_SVG_CODE => Contract::RandomSvg {
				vrf: Address::from_slice(&word(args, 0)?[12..]),
				link: Address::from_slice(&word(args, 1)?[12..]),
				key_hash: B256::from_slice(word(args, 2)?),
				fee: U256::from_be_slice(word(args, 3)?),
				counter: U256::ZERO,
				requests: HashMap::new(),
				random: HashMap::new(),
				uris: HashMap::new(),
			},
			other => return Err(format!("unknown creation code {other:#x}")),
		};

		state.contracts.insert(at, contract);
		state.deployed.push((code, at));
		Ok((Some(at), Vec::new()))
	}

	fn move_link(
		state: &mut State,
		token: Address,
		from: Address,
		to: Address,
		value: U256,
	) -> std::result::Result<(), String> {
		let Some(Contract::LinkToken { balances }) = state.contracts.get_mut(&token) else {
			return Err(format!("{token} is not a LINK token"));
		};
		let have = balances.get(&from).copied().unwrap_or_default();
		if have < value {
			return Err(format!("insufficient LINK: {from} has {have}, needs {value}"));
		}
		balances.insert(from, have - value);
		*balances.entry(to).or_default() += value;
		Ok(())
	}

	fn view(state: &State, to: Address, data: &[u8]) -> std::result::Result<Vec<u8>, String> {
		match state.contracts.get(&to) {
			Some(Contract::SvgNft { uris }) => {
				match SVGNFT::SVGNFTCalls::abi_decode(data, true).map_err(|e| e.to_string())? {
					SVGNFT::SVGNFTCalls::tokenCounter(_) => {
						Ok((U256::from(uris.len()),).abi_encode_params())
					}
					SVGNFT::SVGNFTCalls::tokenURI(call) => {
						let idx: usize = call.tokenId.to();
						let uri = uris.get(idx).cloned().ok_or("nonexistent token")?;
						Ok((uri,).abi_encode_params())
					}
					_ => Err("not a view".into()),
				}
			}
			Some(Contract::RandomSvg { random, uris, .. }) => {
				match RandomSVG::RandomSVGCalls::abi_decode(data, true).map_err(|e| e.to_string())? {
				RandomSVG::RandomSVGCalls::tokenIdToRandomNumber(call) => {
					let value = random.get(&call.tokenId).copied().unwrap_or_default();
					Ok((value,).abi_encode_params())
				}
				RandomSVG::RandomSVGCalls::tokenURI(call) => {
					let uri = uris.get(&call.tokenId).cloned().unwrap_or_default();
					Ok((uri,).abi_encode_params())
				}
				_ => Err("not a view".into()),
				}
			}
			_ => Err(format!("no viewable contract at {to}")),
		}
	}
}

#[async_trait::async_trait]
impl ChainClient for SimulatedChain {
	async fn chain_id(&self) -> Result<u64> {
		Ok(self.chain_id)
	}

	async fn accounts(&self) -> Result<Vec<Address>> {
		Ok(vec![DEPLOYER])
	}

	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
		_policy: &ConfirmationPolicy,
	) -> Result<TxReceipt> {
		let mut state = self.state.lock().unwrap();
		state.block += 1;
		state.sent.push(tx.clone());
		let hash = keccak256((U256::from(state.block), input_of(tx)).abi_encode());
		let silenced = selector_of(tx).is_some_and(|sel| state.silenced.contains(&sel));

		let receipt = match Self::execute(&mut state, tx) {
			Ok((contract_address, logs)) => TxReceipt {
				transaction_hash: hash,
				block_number: state.block,
				success: true,
				contract_address,
				gas_used: 21_000,
				logs: if silenced { Vec::new() } else { logs },
			},
			Err(_) => TxReceipt {
				transaction_hash: hash,
				block_number: state.block,
				success: false,
				contract_address: None,
				gas_used: 21_000,
				logs: Vec::new(),
			},
		};
		Ok(receipt)
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
		let state = self.state.lock().unwrap();
		Self::view(&state, to, &data)
			.map(Bytes::from)
			.map_err(|e| DeployError::Rpc(format!("eth_call reverted: {e}")))
	}
}

fn input_of(tx: &TransactionRequest) -> Bytes {
	tx.input.input().cloned().unwrap_or_default()
}

fn selector_of(tx: &TransactionRequest) -> Option<[u8; 4]> {
	tx.input.input()?.get(..4)?.try_into().ok()
}

fn word(args: &[u8], i: usize) -> std::result::Result<&[u8], String> {
	args.get(i * 32..(i + 1) * 32)
		.ok_or_else(|| format!("missing constructor word {i}"))
}

fn token_uri(svg: &str) -> String {
	format!("data:application/json;svg={}", hex::encode(svg))
}

fn event_log<E: SolEvent>(address: Address, event: &E) -> Log {
	let data = event.encode_log_data();
	Log {
		address,
		topics: data.topics().to_vec(),
		data: data.data.clone(),
	}
}

fn transfer_log(token: Address, from: Address, to: Address, value: U256) -> Log {
	Log {
		address: token,
		topics: vec![
			keccak256("Transfer(address,address,uint256)"),
			from.into_word(),
			to.into_word(),
		],
		data: Bytes::from(value.to_be_bytes::<32>().to_vec()),
	}
}

/// Stands in for the VRF oracle: counts how often it is asked to wait and
/// fulfils the request immediately.
pub struct InstantOracle {
	pub chain: Arc<SimulatedChain>,
	pub calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl FulfillmentWaiter for InstantOracle {
	async fn wait_for_randomness(
		&self,
		_client: &dyn ChainClient,
		consumer: Address,
		token_id: U256,
	) -> Result<()> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.chain.fulfill(consumer, token_id, U256::from(123_456_789u64));
		Ok(())
	}
}

/// Lay out a Hardhat-style artifacts tree plus the SVG asset under `root`.
pub fn write_fixtures(root: &Path) {
	for (name, code) in [
		("LinkToken", LINK_CODE),
		("VRFCoordinatorMock", VRF_CODE),
		("SVGNFT", SVG_CODE),
		("RandomSVG", RANDOM_SVG_CODE),
	] {
		let dir = root.join("artifacts").join("contracts").join(format!("{name}.sol"));
		std::fs::create_dir_all(&dir).unwrap();
		let body = serde_json::json!({
			"contractName": name,
			"abi": [],
			"bytecode": format!("0x{code:02x}"),
		});
		std::fs::write(dir.join(format!("{name}.json")), body.to_string()).unwrap();
	}

	let images = root.join("images");
	std::fs::create_dir_all(&images).unwrap();
	std::fs::write(images.join("lines.svg"), SVG).unwrap();
}

pub fn settings(root: &Path) -> RunSettings {
	RunSettings {
		deployer: None,
		artifacts_dir: root.join("artifacts"),
		deployments_dir: None,
		svg_asset: root.join("images").join("lines.svg"),
		confirmation: ConfirmationPolicy {
			confirmations: 1,
			timeout: Duration::from_secs(5),
		},
		cancel: CancellationToken::new(),
	}
}

/// Connect a context to `chain` using fixtures under `root`, returning the
/// oracle call counter alongside it.
pub async fn connect(
	chain: &Arc<SimulatedChain>,
	settings: RunSettings,
) -> Result<(DeployContext, Arc<AtomicUsize>)> {
	let calls = Arc::new(AtomicUsize::new(0));
	let oracle = InstantOracle {
		chain: chain.clone(),
		calls: calls.clone(),
	};
	let ctx = DeployContext::connect(
		chain.clone(),
		&NetworkConfigTable::builtin(),
		settings,
		Box::new(oracle),
	)
	.await?;
	Ok((ctx, calls))
}
