// Library root
// ------------
// Session wrapper for the Domino's UK ordering site's unofficial HTTP API.
//
// Module responsibilities:
// - `api`: `DominosClient`, which owns one provider session and replays the
//   handshake (session reset, store search and selection, delivery cookie,
//   store context, basket, menu) before basket mutations.
// - `config`: where the provider lives and how the HTTP client is built.
// - `cookies`: the resettable cookie jar the HTTP client sends from.
// - `error`: the error taxonomy returned by every network operation.
// - `models`: typed records for stores, menu items, menus and baskets, plus
//   the add-to-basket request bodies.
//
// There is no front end here; a CLI, service or test harness drives the
// client through its public methods.
pub mod api;
pub mod config;
pub mod cookies;
pub mod error;
pub mod models;

pub use api::DominosClient;
pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use models::{Basket, BasketItem, Item, ItemCategory, Menu, MenuCategory, ProductSku, RemoteId, Store};
