//! Deferred-notification variants of the synchronous operations.
//!
//! Each wrapper runs the synchronous operation *immediately*: the tree is
//! fully updated (or untouched, on failure) before the returned future is
//! ever polled. Only the delivery of the captured result is deferred, by
//! one scheduler turn. Errors arrive through the future, never
//! synchronously. There is no concurrency here and no cancellation beyond
//! dropping the future.

use crate::filesystem::FileSystem;
use crate::{Metadata, ReadDir, Result};
use futures::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Resolves on its second poll, handing the scheduler one turn.
#[derive(Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}

fn deferred<T: Send + 'static>(value: T) -> BoxFuture<'static, T> {
    Box::pin(async move {
        YieldOnce::default().await;
        value
    })
}

impl FileSystem {
    pub fn exists_deferred(&self, path: &str) -> BoxFuture<'static, bool> {
        deferred(self.exists(path))
    }

    pub fn metadata_deferred(&self, path: &str) -> BoxFuture<'static, Result<Metadata>> {
        deferred(self.metadata(path))
    }

    pub fn read_file_deferred(&self, path: &str) -> BoxFuture<'static, Result<Vec<u8>>> {
        deferred(self.read_file(path))
    }

    pub fn read_file_to_string_deferred(&self, path: &str) -> BoxFuture<'static, Result<String>> {
        deferred(self.read_file_to_string(path))
    }

    pub fn read_dir_deferred(&self, path: &str) -> BoxFuture<'static, Result<ReadDir>> {
        deferred(self.read_dir(path))
    }

    pub fn create_dir_deferred(&self, path: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.create_dir(path))
    }

    pub fn create_dir_all_deferred(&self, path: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.create_dir_all(path))
    }

    pub fn write_file_deferred<C: AsRef<[u8]>>(
        &self,
        path: &str,
        contents: Option<C>,
    ) -> BoxFuture<'static, Result<()>> {
        deferred(self.write_file(path, contents))
    }

    pub fn remove_file_deferred(&self, path: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.remove_file(path))
    }

    pub fn remove_dir_deferred(&self, path: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.remove_dir(path))
    }

    pub fn mount_deferred(&self, other: &FileSystem, path: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.mount(other, path))
    }

    pub fn unmount_deferred(&self, path: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.unmount(path))
    }

    pub fn symlink_deferred(&self, source: &str, target: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.symlink(source, target))
    }

    pub fn desymlink_deferred(&self, target: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.desymlink(target))
    }

    pub fn export_deferred(&self) -> BoxFuture<'static, Result<String>> {
        deferred(self.export())
    }

    pub fn import_deferred(&self, snapshot: &str) -> BoxFuture<'static, Result<()>> {
        deferred(self.import(snapshot))
    }
}
