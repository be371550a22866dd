use std::collections::HashSet;
use std::sync::LazyLock;

/// Known exchange and DEX router wallets on Ethereum mainnet, lower-cased.
static EXCHANGE_ADDRESSES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "0x3fc91a3afd70395cd496c647d5a6cc9d4b2b7fad", // Uniswap universal router
        "0x7a250d5630b4cf539739df2c5dacb4c659f2488d", // Uniswap V2 router
        "0xe592427a0aece92de3edee1f18e0157c05861564", // Uniswap V3 router
        "0xf977814e90da44bfa03b6295a0616a897441acec", // Binance 8
        "0x3f5ce5fbfe3e9af3971dd833d26ba9b5c936f0be", // Binance
        "0xd551234ae421e3bcba99a0da6d736074f22192ff", // Binance 2
        "0x564286362092d8e7936f0549571a803b203aced",  // Binance 3
        "0x0681d8db095565fe8a346fa0277bffde9c0edbf",  // Binance 4
        "0x267be1c1d684f78cb4f6a176c4911b741e4ffdc0", // Kraken 4
        "0x6262998ced04146fa42253a5c0af90ca02dfd2a3", // Crypto.com
        "0x503828976d22510aad0201ac7ec88293211d23da", // Coinbase 2
        "0xddfabcdc4d8ffc6d5beaf154f18b778f892a0740", // Coinbase 3
        "0x71660c4005ba85c37ccec55d0c4493e66fe775d3", // Coinbase 1
        "0xa910f92acdaf488fa6ef02174fb86208ad7722ba", // Coinbase 4
        "0x9696f59e4d72e237be84ffd425dcad154bf96976", // Coinbase 6
    ]
    .into_iter()
    .collect()
});

/// Case-insensitive membership in the known-exchange set.
pub fn is_exchange_address(address: &str) -> bool {
    EXCHANGE_ADDRESSES.contains(address.to_ascii_lowercase().as_str())
}
