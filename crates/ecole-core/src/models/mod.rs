//! Record types for every entity kind.

mod academic;
mod community;
mod finance;
mod people;

pub use academic::{
    Attendance, AttendanceStatus, Grade, GradeType, Homework, Room, RoomSchedule, RoomType,
    SchoolClass, Subject,
};
pub use community::{
    Event, EventType, Message, MessageStatus, MessageType, News, NewsType, NotificationType,
    OnlineRegistration, ParentNotification, Priority, RegistrationStatus,
};
pub use finance::{
    InventoryItem, ItemCondition, MonthlySalaryCost, Payment, PaymentMethod, PaymentStatus,
    PaymentType, TeacherAdvance, TeacherSalary,
};
pub use people::{Gender, Role, Staff, Student, User};

use crate::entity::{Entity, EntityKind};
use crate::types::RecordId;

macro_rules! impl_entity {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl Entity for $ty {
                const KIND: EntityKind = EntityKind::$kind;

                fn id(&self) -> &RecordId {
                    &self.id
                }
            }
        )*
    };
}

impl_entity! {
    User => User,
    Student => Student,
    SchoolClass => Class,
    Subject => Subject,
    Grade => Grade,
    Payment => Payment,
    Staff => Staff,
    InventoryItem => InventoryItem,
    News => News,
    Event => Event,
    Homework => Homework,
    OnlineRegistration => OnlineRegistration,
    Room => Room,
    RoomSchedule => RoomSchedule,
    Attendance => Attendance,
    Message => Message,
    ParentNotification => ParentNotification,
    TeacherSalary => TeacherSalary,
    TeacherAdvance => TeacherAdvance,
    MonthlySalaryCost => MonthlySalaryCost,
}
