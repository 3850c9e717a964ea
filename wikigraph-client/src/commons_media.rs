//! Files on Wikimedia Commons.
//!
//! A [`File`] loads its page metadata lazily through [`Client::request`], so
//! media lookups share the session's cache policy with entity data.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use tracing::debug;
use wikigraph_core::{FileError, GraphResult};

use crate::client::Client;

/// A file page, e.g. `File:The Fabs.JPG`.
#[derive(Clone)]
pub struct File {
    client: Client,
    title: String,
    data: RefCell<Option<Rc<Value>>>,
}

impl File {
    pub fn new(client: Client, title: impl Into<String>) -> Self {
        Self {
            client,
            title: title.into(),
            data: RefCell::new(None),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// The page record if loaded, without loading.
    pub fn data(&self) -> Option<Rc<Value>> {
        self.data.borrow().clone()
    }

    fn query_path(&self) -> String {
        format!(
            "./w/api.php?action=query&prop=imageinfo|info&inprop=url&iiprop=url|size|mime&format=json&titles={}",
            urlencoding::encode(&self.title)
        )
    }

    fn malformed(&self, reason: &str) -> FileError {
        FileError::Malformed {
            title: self.title.clone(),
            reason: reason.to_string(),
        }
    }

    pub fn load(&self) -> GraphResult<()> {
        let result = self
            .client
            .request(&self.query_path())?
            .ok_or_else(|| self.malformed("no such page"))?;
        if let Some(error) = result.get("error").filter(|e| !e.is_null()) {
            return Err(FileError::Server {
                title: self.title.clone(),
                error: error.to_string(),
            }
            .into());
        }
        let page = result
            .get("query")
            .and_then(|query| query.get("pages"))
            .and_then(Value::as_object)
            .and_then(|pages| pages.values().next())
            .cloned()
            .ok_or_else(|| self.malformed("missing \"query.pages\""))?;
        debug!(title = %self.title, "loaded media metadata");
        *self.data.borrow_mut() = Some(Rc::new(page));
        Ok(())
    }

    /// The page record, loading it if needed.
    pub fn attributes(&self) -> GraphResult<Rc<Value>> {
        if let Some(data) = self.data() {
            return Ok(data);
        }
        self.load()?;
        self.data()
            .ok_or_else(|| self.malformed("page data missing after load").into())
    }

    /// Canonical URL of the file page.
    pub fn page_url(&self) -> GraphResult<String> {
        self.attributes()?
            .get("canonicalurl")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| self.malformed("missing \"canonicalurl\"").into())
    }

    /// First `imageinfo` record. `None` when the file is not an image.
    fn image_info(&self) -> GraphResult<Option<Value>> {
        Ok(self
            .attributes()?
            .get("imageinfo")
            .and_then(Value::as_array)
            .and_then(|images| images.first())
            .cloned())
    }

    fn image_field<T>(&self, field: &str, read: impl Fn(&Value) -> Option<T>) -> GraphResult<Option<T>> {
        let Some(info) = self.image_info()? else {
            return Ok(None);
        };
        info.get(field)
            .and_then(read)
            .map(Some)
            .ok_or_else(|| self.malformed(&format!("bad imageinfo field \"{field}\"")).into())
    }

    pub fn image_url(&self) -> GraphResult<Option<String>> {
        self.image_field("url", |v| v.as_str().map(str::to_string))
    }

    pub fn image_mimetype(&self) -> GraphResult<Option<String>> {
        self.image_field("mime", |v| v.as_str().map(str::to_string))
    }

    /// `(width, height)` in pixels.
    pub fn image_resolution(&self) -> GraphResult<Option<(u64, u64)>> {
        let Some(info) = self.image_info()? else {
            return Ok(None);
        };
        let width = info.get("width").and_then(Value::as_u64);
        let height = info.get("height").and_then(Value::as_u64);
        match (width, height) {
            (Some(width), Some(height)) => Ok(Some((width, height))),
            _ => Err(self.malformed("bad imageinfo resolution").into()),
        }
    }

    /// Size in bytes.
    pub fn image_size(&self) -> GraphResult<Option<u64>> {
        self.image_field("size", Value::as_u64)
    }
}

impl PartialEq for File {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title && self.client.ptr_eq(&other.client)
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<File {:?}>", self.title)
    }
}
