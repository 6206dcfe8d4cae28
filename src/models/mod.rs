mod activity;
mod announcement;
mod document;
mod finance;
mod notification;
mod role;
mod user;

pub use activity::{Activity, ActivityKind};
pub use announcement::{Announcement, AnnouncementCategory};
pub use document::{Document, DocumentPatch, DocumentStatus};
pub use finance::{
    Budget, BudgetPatch, BudgetPeriod, Expense, ExpensePatch, Invoice, InvoicePatch, InvoiceStatus,
    NewBudget, NewExpense, NewInvoice, NewRevenue, Revenue, RevenuePatch,
};
pub use notification::{NewNotification, Notification, NotificationKind};
pub use role::{Badge, Department, Role};
pub use user::{NewUser, PublicUser, User};
