//! Rendering of card notifications from templates.

use crate::card::{
    domain::{AssigneeId, Card, CardTransition, CardTrigger},
    ports::{CardNotification, NotificationKind},
};
use minijinja::{Environment, context};

/// Subject and body templates keyed by notification kind.
const TEMPLATES: [(NotificationKind, &str, &str); 6] = [
    (
        NotificationKind::Assigned,
        "[{{ subject_kind }} {{ subject_ref }}] New card: {{ title }}",
        "{{ assignee }}, you own a new card \"{{ title }}\" for {{ subject_kind }} \
         {{ subject_ref }}. Warning at {{ warning_at }}, breach at {{ breach_at }}.",
    ),
    (
        NotificationKind::Warning,
        "[{{ subject_kind }} {{ subject_ref }}] Card nearing breach: {{ title }}",
        "{{ assignee }}, card \"{{ title }}\" breaches at {{ breach_at }}.",
    ),
    (
        NotificationKind::Breached,
        "[{{ subject_kind }} {{ subject_ref }}] Card breached: {{ title }}",
        "Card \"{{ title }}\" passed its breach deadline {{ breach_at }} while held by \
         {{ previous_assignee }}.{% if escalated %} It is now escalated to {{ assignee }} \
         (level {{ level }}).{% endif %}",
    ),
    (
        NotificationKind::Escalated,
        "[{{ subject_kind }} {{ subject_ref }}] Card escalated: {{ title }}",
        "Breached card \"{{ title }}\" moved from {{ previous_assignee }} to {{ assignee }} \
         (level {{ level }}).",
    ),
    (
        NotificationKind::Reassigned,
        "[{{ subject_kind }} {{ subject_ref }}] Card reassigned: {{ title }}",
        "Card \"{{ title }}\" moved from {{ previous_assignee }} to {{ assignee }} by \
         {{ actor }}. Warning at {{ warning_at }}, breach at {{ breach_at }}.",
    ),
    (
        NotificationKind::Completed,
        "[{{ subject_kind }} {{ subject_ref }}] Card completed: {{ title }}",
        "Card \"{{ title }}\" was completed by {{ actor }}.",
    ),
];

/// Renders [`CardNotification`]s for opened and transitioned cards.
#[derive(Debug, Default)]
pub struct NotificationTemplates {
    env: Environment<'static>,
}

impl NotificationTemplates {
    /// Creates a renderer over the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the notification kind a transition produces, if any.
    #[must_use]
    pub fn kind_for(transition: &CardTransition) -> Option<NotificationKind> {
        match transition.trigger {
            CardTrigger::WarningDeadlinePassed => Some(NotificationKind::Warning),
            CardTrigger::BreachDeadlinePassed => Some(NotificationKind::Breached),
            CardTrigger::EscalationDeadlinePassed => Some(NotificationKind::Escalated),
            CardTrigger::Reassign => Some(NotificationKind::Reassigned),
            CardTrigger::Complete => Some(NotificationKind::Completed),
            CardTrigger::Delete => None,
        }
    }

    /// Renders the notification sent when a card is opened.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] when rendering fails.
    pub fn render_opened(&self, card: &Card) -> Result<CardNotification, minijinja::Error> {
        self.render(
            card,
            NotificationKind::Assigned,
            vec![card.assignee().clone()],
            None,
        )
    }

    /// Renders the notification for `transition`, or `None` when the
    /// transition is silent.
    ///
    /// # Errors
    ///
    /// Returns a [`minijinja::Error`] when rendering fails.
    pub fn render_transition(
        &self,
        card: &Card,
        transition: &CardTransition,
    ) -> Result<Option<CardNotification>, minijinja::Error> {
        let Some(kind) = Self::kind_for(transition) else {
            return Ok(None);
        };
        let recipients = match kind {
            NotificationKind::Assigned | NotificationKind::Warning => {
                vec![transition.assignee_after.clone()]
            }
            NotificationKind::Breached
            | NotificationKind::Escalated
            | NotificationKind::Reassigned => vec![
                transition.assignee_after.clone(),
                transition.assignee_before.clone(),
            ],
            NotificationKind::Completed => vec![card.chain().owner().clone()],
        };
        self.render(card, kind, recipients, Some(transition)).map(Some)
    }

    fn render(
        &self,
        card: &Card,
        kind: NotificationKind,
        recipients: Vec<AssigneeId>,
        transition: Option<&CardTransition>,
    ) -> Result<CardNotification, minijinja::Error> {
        let (subject_source, body_source) = TEMPLATES
            .iter()
            .find(|(template_kind, _, _)| *template_kind == kind)
            .map(|(_, subject, body)| (*subject, *body))
            .ok_or_else(|| {
                minijinja::Error::new(
                    minijinja::ErrorKind::TemplateNotFound,
                    format!("no template for {kind}"),
                )
            })?;

        let previous_assignee = transition
            .map_or_else(|| card.assignee().to_string(), |t| t.assignee_before.to_string());
        let actor = transition.map_or_else(|| "system".to_owned(), |t| t.actor.to_string());
        let ctx = context! {
            card_id => card.id().to_string(),
            title => card.title().as_str(),
            subject_kind => card.subject().kind().as_str(),
            subject_ref => card.subject().reference(),
            assignee => card.assignee().as_str(),
            previous_assignee => previous_assignee,
            level => card.level(),
            escalated => transition.is_some_and(CardTransition::escalated),
            actor => actor,
            warning_at => card.deadlines().warning_at().to_rfc3339(),
            breach_at => card.deadlines().breach_at().to_rfc3339(),
        };

        let subject = self.env.render_named_str(
            &format!("{}.subject", kind.as_str()),
            subject_source,
            &ctx,
        )?;
        let body =
            self.env
                .render_named_str(&format!("{}.body", kind.as_str()), body_source, &ctx)?;

        let mut distinct: Vec<AssigneeId> = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            if !distinct.contains(&recipient) {
                distinct.push(recipient);
            }
        }

        Ok(CardNotification {
            card_id: card.id(),
            kind,
            recipients: distinct,
            subject,
            body,
        })
    }
}
