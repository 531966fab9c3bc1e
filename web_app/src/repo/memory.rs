//! Process local [`LeadRepo`](super::LeadRepo) backed by hash maps.
//!
//! ntex builds one app instance per worker, so clones share the same maps.
//! Nothing survives a restart and every process has its own view of the data.

use crate::{consts, models};
use async_trait::async_trait;
use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    email_subscriptions: HashMap<String, models::subscription::EmailSubscription>,
    /// value is (insertion sequence, record)
    call_requests: HashMap<Uuid, (u64, models::call_request::CallRequest)>,
    next_call_request_seq: u64,
}

#[derive(Clone, Default)]
pub struct InMemoryRepo {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl super::LeadRepo for InMemoryRepo {
    async fn create_email_subscription(
        &self,
        email: &str,
    ) -> anyhow::Result<models::subscription::EmailSubscription> {
        let subscription = models::subscription::EmailSubscription::create_from_email(email);

        self.tables
            .write()
            .await
            .email_subscriptions
            .insert(subscription.email.clone(), subscription.clone());

        Ok(subscription)
    }

    async fn create_email_subscription_if_absent(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<models::subscription::EmailSubscription>> {
        let mut tables = self.tables.write().await;

        match tables.email_subscriptions.entry(email.to_string()) {
            Entry::Occupied(_) => Ok(None),
            Entry::Vacant(slot) => {
                let subscription = models::subscription::EmailSubscription::create_from_email(email);
                Ok(Some(slot.insert(subscription).clone()))
            }
        }
    }

    async fn get_email_subscription(
        &self,
        email: &str,
    ) -> anyhow::Result<Option<models::subscription::EmailSubscription>> {
        Ok(self
            .tables
            .read()
            .await
            .email_subscriptions
            .get(email)
            .cloned())
    }

    async fn create_call_request(
        &self,
        request: models::call_request::NewCallRequest,
    ) -> anyhow::Result<models::call_request::CallRequest> {
        let call_request = models::call_request::CallRequest::from(request);

        let mut tables = self.tables.write().await;
        let seq = tables.next_call_request_seq;
        tables.next_call_request_seq += 1;
        tables
            .call_requests
            .insert(call_request.id, (seq, call_request.clone()));

        Ok(call_request)
    }

    async fn get_call_request(
        &self,
        id: Uuid,
    ) -> anyhow::Result<Option<models::call_request::CallRequest>> {
        Ok(self
            .tables
            .read()
            .await
            .call_requests
            .get(&id)
            .map(|(_, request)| request.clone()))
    }

    async fn list_recent_call_requests(
        &self,
    ) -> anyhow::Result<Vec<models::call_request::CallRequest>> {
        let tables = self.tables.read().await;

        let mut requests = tables.call_requests.values().collect::<Vec<_>>();
        // insertion order breaks ties between equal timestamps
        requests.sort_by(|(seq_a, a), (seq_b, b)| {
            b.created_at.cmp(&a.created_at).then(seq_b.cmp(seq_a))
        });

        Ok(requests
            .into_iter()
            .take(consts::RECENT_CALL_REQUESTS_LIMIT)
            .map(|(_, request)| request.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::LeadRepo;

    fn new_call_request(name: &str) -> models::call_request::NewCallRequest {
        models::call_request::NewCallRequest {
            name: name.to_string(),
            phone_number: "+919876543210".to_string(),
            email: None,
        }
    }

    #[ntex::test]
    async fn test_create_then_get_email_subscription() {
        let repo = InMemoryRepo::new();

        let created = repo
            .create_email_subscription("asha@example.com")
            .await
            .unwrap();
        let found = repo.get_email_subscription("asha@example.com").await.unwrap();

        assert!(found.is_some_and(|s| s.email == "asha@example.com"
            && s.id == created.id
            && s.created_at == created.created_at));
    }

    #[ntex::test]
    async fn test_create_if_absent_keeps_the_first_record() {
        let repo = InMemoryRepo::new();

        let first = repo
            .create_email_subscription_if_absent("asha@example.com")
            .await
            .unwrap()
            .unwrap();
        let second = repo
            .create_email_subscription_if_absent("asha@example.com")
            .await
            .unwrap();
        let stored = repo.get_email_subscription("asha@example.com").await.unwrap();

        assert!(second.is_none());
        assert_eq!(stored, Some(first));
    }

    #[ntex::test]
    async fn test_get_email_subscription_absent() {
        let repo = InMemoryRepo::new();
        let found = repo.get_email_subscription("nobody@example.com").await.unwrap();
        assert!(found.is_none());
    }

    #[ntex::test]
    async fn test_clones_share_the_same_tables() {
        let repo = InMemoryRepo::new();
        let worker_copy = repo.clone();

        repo.create_email_subscription("shared@example.com")
            .await
            .unwrap();

        assert!(
            worker_copy
                .get_email_subscription("shared@example.com")
                .await
                .unwrap()
                .is_some()
        );
    }

    #[ntex::test]
    async fn test_create_call_request_can_be_found_by_id() {
        let repo = InMemoryRepo::new();

        let created = repo.create_call_request(new_call_request("Asha")).await.unwrap();
        let found = repo.get_call_request(created.id).await.unwrap();

        assert_eq!(found, Some(created));
        assert!(repo.get_call_request(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[ntex::test]
    async fn test_list_recent_call_requests_is_capped_and_newest_first() {
        let repo = InMemoryRepo::new();
        for i in 0..130 {
            repo.create_call_request(new_call_request(&format!("Lead {i}")))
                .await
                .unwrap();
        }

        let recent = repo.list_recent_call_requests().await.unwrap();

        assert_eq!(recent.len(), consts::RECENT_CALL_REQUESTS_LIMIT);
        assert_eq!(recent[0].name, "Lead 129");
        assert_eq!(recent[99].name, "Lead 30");
        assert!(recent.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    #[ntex::test]
    async fn test_list_recent_call_requests_empty() {
        let repo = InMemoryRepo::new();
        assert!(repo.list_recent_call_requests().await.unwrap().is_empty());
    }
}
