//! Test fixtures and helpers.
//!
//! Common setup code for integration tests: facades over each backend and
//! fully populated sample records.

use ecole::SchoolDb;
use ecole_core::{
    Attendance, AttendanceStatus, Document, Entity, EntityKind, Event, EventType, Gender, Grade,
    GradeType, Homework, InventoryItem, ItemCondition, Message, MessageStatus, MessageType, Month,
    MonthlySalaryCost, News, NewsType, NotificationType, OnlineRegistration, ParentNotification,
    Payment, PaymentMethod, PaymentStatus, PaymentType, Priority, RecordId, RegistrationStatus,
    Role, Room, RoomSchedule, RoomType, SalaryStatus, SchoolClass, Staff, Student, Subject,
    TeacherAdvance, TeacherSalary, User,
};
use ecole_store::{LocalStore, MemoryKv, RemoteStore, SqliteRowStore};

/// Facade over the local backend with in-memory storage.
pub type LocalDb = SchoolDb<LocalStore<MemoryKv>>;

/// Facade over the remote backend with an in-memory SQLite database.
pub type SqliteDb = SchoolDb<RemoteStore<SqliteRowStore>>;

pub fn local_db() -> LocalDb {
    SchoolDb::new(LocalStore::new(MemoryKv::new()))
}

pub fn sqlite_db() -> SqliteDb {
    let rows = SqliteRowStore::open_memory().expect("in-memory sqlite opens");
    SchoolDb::new(RemoteStore::new(rows))
}

pub fn month(s: &str) -> Month {
    Month::parse(s).expect("valid month literal")
}

pub fn id(s: &str) -> RecordId {
    RecordId::new(s)
}

// ─────────────────────────────────────────────────────────────────────────────
// Records
// ─────────────────────────────────────────────────────────────────────────────

pub fn parent_user(user_id: &str, email: &str) -> User {
    User {
        id: id(user_id),
        username: format!("parent{}", user_id),
        password: "parent123".to_string(),
        role: Role::Parent,
        name: "Parent Test".to_string(),
        email: Some(email.to_string()),
        phone: Some("+225 07 00 00 00".to_string()),
        profile_photo: Some("data:image/png;base64,AAAA".to_string()),
        assigned_classes: vec![id("c1")],
        children_ids: vec![id("s1")],
        permissions: vec!["view_grades".to_string()],
        is_active: true,
        created_at: "2024-01-15T08:00:00Z".to_string(),
    }
}

pub fn contact_message(message_id: &str, sender_email: &str, subject: &str) -> Message {
    Message {
        id: id(message_id),
        sender_name: "Parent Test".to_string(),
        sender_email: Some(sender_email.to_string()),
        sender_phone: Some("+225 07 00 00 00".to_string()),
        subject: subject.to_string(),
        message: "Bonjour".to_string(),
        message_type: MessageType::Contact,
        status: MessageStatus::Unread,
        created_at: "2024-03-01T09:30:00Z".to_string(),
        priority: Priority::Medium,
        recipient_id: Some(id("1")),
        parent_message_id: Some(id("m0")),
        is_from_admin: false,
    }
}

pub fn advance(advance_id: &str, teacher_id: &str, month_str: &str, amount: i64) -> TeacherAdvance {
    let month = month(month_str);
    TeacherAdvance {
        id: id(advance_id),
        teacher_id: id(teacher_id),
        amount,
        date: format!("{}-05", month_str),
        reason: "Avance sur salaire".to_string(),
        method: PaymentMethod::Mobile,
        approved_by: id("1"),
        receipt_number: format!("ADV{}", advance_id),
        year: month.year().to_string(),
        month,
    }
}

pub fn staff(staff_id: &str) -> Staff {
    Staff {
        id: id(staff_id),
        first_name: "Awa".to_string(),
        last_name: "Koné".to_string(),
        position: "Secrétaire".to_string(),
        department: "Administration".to_string(),
        education: "BTS".to_string(),
        experience: "5 ans".to_string(),
        hire_date: "2020-09-01".to_string(),
        phone: "+225 05 00 00 00".to_string(),
        email: "awa@ecole.ci".to_string(),
        address: "Abidjan".to_string(),
        is_active: true,
        observations: Some("RAS".to_string()),
        profile_photo: Some("data:image/png;base64,AAAA".to_string()),
        documents: vec!["data:application/pdf;base64,JVBERg==".to_string()],
    }
}

pub fn homework(homework_id: &str) -> Homework {
    Homework {
        id: id(homework_id),
        title: "Exercices de géométrie".to_string(),
        description: "Pages 12 à 14".to_string(),
        subject_id: id("2"),
        class_id: id("c1"),
        teacher_id: id("t1"),
        due_date: "2024-03-12".to_string(),
        is_published: true,
        created_at: "2024-03-05T10:00:00Z".to_string(),
        documents: vec![],
    }
}

/// One fully populated record of every kind: every optional field set and
/// every list non-empty, so a round trip exercises every mapped field.
pub fn sample_documents() -> Vec<(EntityKind, Document)> {
    let teacher_salary = TeacherSalary {
        id: id("sal1"),
        teacher_id: id("t1"),
        base_salary: 300_000,
        advances: vec![advance("a0", "t1", "2024-03", 50_000)],
        bonuses: 20_000,
        deductions: 10_000,
        month: month("2024-03"),
        year: "2024".to_string(),
        total_paid: 70_000,
        remaining_balance: 220_000,
        status: SalaryStatus::Partial,
        notes: Some("Mars".to_string()),
        finalized_at: Some("2024-03-31T18:00:00Z".to_string()),
    };

    vec![
        doc(&parent_user("u1", "parent@ecole.ci")),
        doc(&Student {
            id: id("s1"),
            first_name: "Jean".to_string(),
            last_name: "Martin".to_string(),
            date_of_birth: "2012-05-14".to_string(),
            gender: Gender::M,
            class_id: id("c1"),
            parent_name: "Parent Test".to_string(),
            parent_phone: "+225 07 00 00 00".to_string(),
            parent_email: Some("parent@ecole.ci".to_string()),
            address: "Cocody".to_string(),
            enrollment_date: "2023-09-04".to_string(),
            profile_photo: Some("data:image/png;base64,AAAA".to_string()),
            student_number: "2023001".to_string(),
            is_active: true,
            medical_info: Some("Asthme".to_string()),
        }),
        doc(&SchoolClass {
            id: id("c1"),
            name: "6ème A".to_string(),
            level: "6ème".to_string(),
            teacher_id: id("t1"),
            academic_year: "2023-2024".to_string(),
            subjects: vec![id("1"), id("2")],
            max_students: 40,
        }),
        doc(&Subject {
            id: id("1"),
            name: "Français".to_string(),
            code: "FR".to_string(),
            coefficient: 4,
            description: Some("Langue française".to_string()),
        }),
        doc(&Grade {
            id: id("g1"),
            student_id: id("s1"),
            subject_id: id("1"),
            class_id: id("c1"),
            value: 15.5,
            max_value: 20.0,
            grade_type: GradeType::Devoir,
            date: "2024-02-10".to_string(),
            term: "Trimestre 2".to_string(),
            teacher_id: id("t1"),
            comment: Some("Bien".to_string()),
        }),
        doc(&Payment {
            id: id("p1"),
            student_id: id("s1"),
            amount: 75_000,
            payment_type: PaymentType::Scolarite,
            description: "Deuxième tranche".to_string(),
            date: "2024-01-20".to_string(),
            method: PaymentMethod::Virement,
            status: PaymentStatus::Completed,
            receipt_number: "REC2024001".to_string(),
            academic_year: "2023-2024".to_string(),
            paid_by: "Parent Test".to_string(),
        }),
        doc(&staff("st1")),
        doc(&InventoryItem {
            id: id("i1"),
            name: "Projecteur".to_string(),
            category: "Informatique".to_string(),
            quantity: 2,
            condition: ItemCondition::Bon,
            location: "Salle 3".to_string(),
            purchase_date: "2022-10-01".to_string(),
            value: 450_000,
            last_updated: "2024-01-05".to_string(),
            observations: Some("Lampe changée".to_string()),
        }),
        doc(&News {
            id: id("n1"),
            title: "Rentrée".to_string(),
            content: "La rentrée aura lieu le 4 septembre.".to_string(),
            news_type: NewsType::Announcement,
            date: "2024-08-20".to_string(),
            publish_date: "2024-08-21".to_string(),
            author_id: id("1"),
            is_published: true,
            priority: Priority::High,
            image_url: Some("https://ecole.ci/rentree.png".to_string()),
        }),
        doc(&Event {
            id: id("e1"),
            title: "Réunion parents".to_string(),
            description: "Bilan du trimestre".to_string(),
            date: "2024-04-02".to_string(),
            start_time: "16:00".to_string(),
            end_time: "18:00".to_string(),
            location: "Préau".to_string(),
            event_type: EventType::Meeting,
            is_public: false,
            created_by: id("1"),
        }),
        doc(&Homework {
            documents: vec!["data:application/pdf;base64,JVBERg==".to_string()],
            ..homework("h1")
        }),
        doc(&OnlineRegistration {
            id: id("r1"),
            student_first_name: "Marie".to_string(),
            student_last_name: "Yao".to_string(),
            date_of_birth: "2013-02-02".to_string(),
            gender: Gender::F,
            desired_level: "CM2".to_string(),
            parent_name: "Paul Yao".to_string(),
            parent_phone: "+225 01 00 00 00".to_string(),
            parent_email: "paul@ecole.ci".to_string(),
            address: "Yopougon".to_string(),
            status: RegistrationStatus::Pending,
            submitted_at: "2024-06-01T12:00:00Z".to_string(),
            documents: vec!["data:application/pdf;base64,JVBERg==".to_string()],
            notes: Some("Frère déjà inscrit".to_string()),
        }),
        doc(&Room {
            id: id("room1"),
            name: "Laboratoire".to_string(),
            capacity: 24,
            room_type: RoomType::Lab,
            equipment: vec!["Microscopes".to_string()],
            is_available: true,
        }),
        doc(&RoomSchedule {
            id: id("rs1"),
            room_id: id("room1"),
            class_id: id("c1"),
            subject_id: id("2"),
            teacher_id: id("t1"),
            day: "lundi".to_string(),
            start_time: "08:00".to_string(),
            end_time: "10:00".to_string(),
            academic_year: "2023-2024".to_string(),
            documents: vec!["data:application/pdf;base64,JVBERg==".to_string()],
            notes: Some("TP".to_string()),
        }),
        doc(&Attendance {
            id: id("at1"),
            student_id: id("s1"),
            class_id: id("c1"),
            date: "2024-03-04".to_string(),
            status: AttendanceStatus::Excused,
            reason: Some("Maladie".to_string()),
            recorded_by: id("t1"),
        }),
        doc(&contact_message("m1", "parent@ecole.ci", "Bulletin")),
        doc(&ParentNotification {
            id: id("pn1"),
            parent_id: id("u1"),
            message_id: Some(id("m1")),
            title: "Nouvelle réponse".to_string(),
            content: "Vous avez reçu une réponse.".to_string(),
            notification_type: NotificationType::MessageReply,
            is_read: false,
            created_at: "2024-03-02T10:00:00Z".to_string(),
        }),
        doc(&teacher_salary),
        doc(&advance("a1", "t1", "2024-03", 50_000)),
        doc(&MonthlySalaryCost {
            id: id("cost1"),
            month: month("2024-03"),
            year: "2024".to_string(),
            total_base_salaries: 300_000,
            total_advances: 50_000,
            total_bonuses: 20_000,
            total_deductions: 10_000,
            total_cost: 310_000,
            teacher_count: 1,
            generated_date: "2024-03-31".to_string(),
        }),
    ]
}

fn doc<E: Entity>(record: &E) -> (EntityKind, Document) {
    (E::KIND, record.to_document().expect("sample records encode"))
}
