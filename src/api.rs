// Session client: one blocking reqwest client, one cookie jar and the state
// the provider expects us to carry between calls. The operations must be
// called in handshake order (reset, search, select, cookie, context, basket,
// menu, then basket mutations); the client does not enforce that order.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::cookies::SessionJar;
use crate::error::{ClientError, Result};
use crate::models::{
    AddItemRequest, Basket, BasketItem, CategoryGroup, Item, Menu, RemoteId, Store, StoreContext,
};

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Fulfilment method understood by `Journey/Initialize` as delivery.
const FULFILMENT_DELIVERY: &str = "1";

/// Stateful client for one provider session.
pub struct DominosClient {
    client: Client,
    jar: Arc<SessionJar>,
    config: ClientConfig,
    stores: Vec<Store>,
    menu_version: Option<RemoteId>,
    menu: Menu,
    basket: Option<Basket>,
}

impl DominosClient {
    /// Build a client without touching the network.
    pub fn new(config: ClientConfig) -> anyhow::Result<Self> {
        let jar = Arc::new(SessionJar::new());
        let mut builder = Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .user_agent(config.user_agent.as_str());
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(DominosClient {
            client,
            jar,
            config,
            stores: Vec::new(),
            menu_version: None,
            menu: Menu::default(),
            basket: None,
        })
    }

    /// Build a client and start from a fresh server side session.
    pub fn open(config: ClientConfig) -> anyhow::Result<Self> {
        let mut client = Self::new(config)?;
        client.reset_session();
        Ok(client)
    }

    /// [`DominosClient::open`] with [`ClientConfig::from_env`].
    pub fn from_env() -> anyhow::Result<Self> {
        Self::open(ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Stores from the most recent search.
    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    pub fn menu_version(&self) -> Option<&RemoteId> {
        self.menu_version.as_ref()
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn basket(&self) -> Option<&Basket> {
        self.basket.as_ref()
    }

    /// Expire the server side session and start over with an empty cookie
    /// jar. The expire call is best effort: the jar is replaced whatever it
    /// returns. Menu version, menu and basket are left as they were and are
    /// stale until fetched again.
    pub fn reset_session(&mut self) {
        let url = self.config.endpoint("Home/SessionExpire");
        match self.client.get(&url).send() {
            Ok(res) => debug!(status = %res.status(), "session expired"),
            Err(err) => warn!(error = %err, "session expire request failed"),
        }
        self.jar.reset();
    }

    /// Search stores by free text (usually a postcode). Replaces the cached
    /// store list; no matches is an empty list, not an error.
    #[instrument(skip(self))]
    pub fn search_stores(&mut self, term: &str) -> Result<&[Store]> {
        self.stores.clear();
        let url = self.config.endpoint("storelocatormap/storenamesearch");
        let res = self.client.get(&url).query(&[("search", term)]).send()?;
        self.stores = read_json(res)?;
        debug!(count = self.stores.len(), "stores found");
        Ok(&self.stores)
    }

    /// Store at `index` in the last search result. No I/O.
    pub fn select_store(&self, index: usize) -> Result<&Store> {
        self.stores
            .get(index)
            .ok_or(ClientError::StoreIndexOutOfRange {
                index,
                len: self.stores.len(),
            })
    }

    /// Initialise delivery from `store` to `postcode`. The response only
    /// matters for the cookies it sets, which every later call needs.
    pub fn get_cookie(&self, store: &Store, postcode: &str) -> Result<()> {
        let url = self.config.endpoint("Journey/Initialize");
        let store_id = store.id.to_string();
        let res = self
            .client
            .get(&url)
            .query(&[
                ("fulfilmentmethod", FULFILMENT_DELIVERY),
                ("storeId", store_id.as_str()),
                ("postcode", postcode),
            ])
            .send()?;
        ensure_success(res)?;
        debug!(store = %store.id, "delivery initialised");
        Ok(())
    }

    /// Fetch the store context and remember its menu version. Fails
    /// transiently under rate limiting; wait and call again.
    pub fn get_store_context(&mut self) -> Result<&RemoteId> {
        let url = self.config.endpoint("ProductCatalog/GetStoreContext");
        let res = self
            .client
            .get(&url)
            .query(&[("_", epoch_seconds())])
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .send()?;
        let context: StoreContext = read_json(res)?;
        let version = context.session_context.menu_version;
        debug!(menu_version = %version, "store context loaded");
        Ok(self.menu_version.insert(version))
    }

    /// Fetch the current basket, replacing the cached one. Same transient
    /// failure behaviour as [`DominosClient::get_store_context`].
    pub fn get_basket(&mut self) -> Result<&Basket> {
        let url = self.config.endpoint("Basket/GetBasket");
        let res = self.client.get(&url).send()?;
        let basket: Basket = read_json(res)?;
        debug!(items = basket.items.len(), "basket loaded");
        Ok(self.basket.insert(basket))
    }

    /// Fetch the catalog for `store` at the current menu version and rebuild
    /// the menu from it. Without a menu version this returns
    /// [`ClientError::MenuVersionUnavailable`] before any request is made.
    pub fn get_menu(&mut self, store: &Store) -> Result<&Menu> {
        self.menu = Menu::default();
        let version = self
            .menu_version
            .as_ref()
            .ok_or(ClientError::MenuVersionUnavailable)?
            .to_string();

        let url = self.config.endpoint("ProductCatalog/GetStoreCatalog");
        let store_id = store.id.to_string();
        let res = self
            .client
            .get(&url)
            .query(&[
                ("collectionOnly", "false"),
                ("menuVersion", version.as_str()),
                ("storeId", store_id.as_str()),
            ])
            .send()?;
        let groups: Vec<CategoryGroup> = read_json(res)?;
        self.menu = Menu::from_catalog(groups);
        debug!(items = self.menu.len(), menu_version = %version, "menu loaded");
        Ok(&self.menu)
    }

    /// Add one `item` in size `size_index` to the basket. Only a 200 with a
    /// basket body replaces the cached basket; any failure leaves it as is.
    #[instrument(skip(self, item), fields(product = %item.product_id, kind = %item.kind))]
    pub fn add_item(&mut self, item: &Item, size_index: usize) -> Result<&Basket> {
        let request = AddItemRequest::for_item(item, size_index)?;
        let url = self.config.endpoint(request.path());
        let body = serde_json::to_vec(&request).map_err(ClientError::Encode)?;
        let res = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .body(body)
            .send()?;
        let basket: Basket = read_json_when(res, |status| status == StatusCode::OK)?;
        info!(name = %item.name, "item added to basket");
        Ok(self.basket.insert(basket))
    }

    /// Remove the basket line at `index`. The removal is keyed by the line's
    /// own basket item id. Like `add_item`, only a 200 with a basket body
    /// counts. Returns the removed line; on failure the cached basket is
    /// unchanged.
    pub fn remove_item(&mut self, index: usize) -> Result<BasketItem> {
        let basket = self.basket.as_ref().ok_or(ClientError::NoBasket)?;
        let line = basket
            .items
            .get(index)
            .cloned()
            .ok_or(ClientError::BasketItemIndexOutOfRange {
                index,
                len: basket.items.len(),
            })?;

        let url = self.config.endpoint("Basket/RemoveBasketItem");
        let basket_item_id = line.basket_item_id.to_string();
        let result = self
            .client
            .get(&url)
            .query(&[
                ("basketItemId", basket_item_id.as_str()),
                ("wizardItemDelete", "false"),
            ])
            .send()
            .map_err(ClientError::from)
            .and_then(|res| read_json_when(res, |status| status == StatusCode::OK));

        match result {
            Ok(basket) => {
                info!(title = %line.title, "removed item from basket");
                self.basket = Some(basket);
                Ok(line)
            }
            Err(err) => {
                warn!(title = %line.title, error = %err, "failed to remove item from basket");
                Err(err)
            }
        }
    }
}

/// Seconds since the UNIX epoch, used as a cache buster.
fn epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn ensure_success(res: Response) -> Result<Response> {
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let body = res.text().unwrap_or_default();
    Err(ClientError::Status { status, body })
}

fn read_json<T: DeserializeOwned>(res: Response) -> Result<T> {
    read_json_when(res, |status| status.is_success())
}

fn read_json_when<T, F>(res: Response, accept: F) -> Result<T>
where
    T: DeserializeOwned,
    F: FnOnce(StatusCode) -> bool,
{
    let status = res.status();
    let body = res.text()?;
    if !accept(status) {
        return Err(ClientError::Status { status, body });
    }
    Ok(serde_json::from_str(&body)?)
}
