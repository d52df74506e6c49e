//! Identity provider settings

use url::Url;

use crate::{ClientId, ClientIdRef, Realm, RealmRef, SessionKey};

/// The realm and client this application is registered as on the identity provider
#[derive(Clone, Debug)]
pub struct IdentityProvider {
    url: Url,
    realm: Realm,
    client_id: ClientId,
}

impl IdentityProvider {
    /// Constructs provider settings
    ///
    /// `url` is the provider's base URL. It is treated as a directory, so a
    /// trailing `/` is added when missing.
    pub fn new(mut url: Url, realm: Realm, client_id: ClientId) -> Self {
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        Self {
            url,
            realm,
            client_id,
        }
    }

    /// Gets the provider's base URL
    #[inline]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Gets the realm
    #[inline]
    pub fn realm(&self) -> &RealmRef {
        &self.realm
    }

    /// Gets the client ID
    #[inline]
    pub fn client_id(&self) -> &ClientIdRef {
        &self.client_id
    }

    /// The OpenID Connect authority, `{url}realms/{realm}`
    pub fn authority(&self) -> String {
        format!("{}realms/{}", self.url, self.realm)
    }

    /// The key under which the identity library persists the signed-in user
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(format!("oidc.user:{}:{}", self.authority(), self.client_id))
    }

    /// Builds the URL that starts an authorization code login
    ///
    /// After signing in, the provider redirects the user agent back to
    /// `redirect_uri` with a code for the identity library to exchange.
    pub fn authorization_url(&self, redirect_uri: &Url) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&format!(
            "{}/protocol/openid-connect/auth",
            self.authority()
        ))?;

        url.query_pairs_mut()
            .append_pair("client_id", self.client_id.as_str())
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", "openid");

        Ok(url)
    }
}
