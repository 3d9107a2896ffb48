//! Embedded descriptor tables for the lobby protocol surface.
//!
//! The registry is compiled in: every method and notification the client is
//! known to emit during lobby navigation is listed here with its request and
//! response shapes. Names not in these tables are a schema gap at decode
//! time, never guessed at. Many fetch-style calls share the common
//! empty-request / error-only-response pair, mirroring how the protocol
//! reuses its generic shapes.

use super::{FieldDescriptor, FieldKind, MessageDescriptor};

/// Envelope carried inside every frame: a dotted method or type name plus
/// the opaque payload bytes for that name.
pub(crate) static WRAPPER: MessageDescriptor = MessageDescriptor {
    name: ".lq.Wrapper",
    fields: &[
        FieldDescriptor { number: 1, name: "name", kind: FieldKind::String, repeated: false },
        FieldDescriptor { number: 2, name: "data", kind: FieldKind::Bytes, repeated: false },
    ],
};

static ERROR: MessageDescriptor = MessageDescriptor {
    name: ".lq.Error",
    fields: &[
        FieldDescriptor { number: 1, name: "code", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor { number: 2, name: "str_params", kind: FieldKind::String, repeated: true },
    ],
};

static REQ_COMMON: MessageDescriptor =
    MessageDescriptor { name: ".lq.ReqCommon", fields: &[] };

static RES_COMMON: MessageDescriptor = MessageDescriptor {
    name: ".lq.ResCommon",
    fields: &[FieldDescriptor {
        number: 1,
        name: "error",
        kind: FieldKind::Message(&ERROR),
        repeated: false,
    }],
};

static REQ_HEATBEAT: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqHeatBeat",
    fields: &[FieldDescriptor {
        number: 1,
        name: "no_operation_counter",
        kind: FieldKind::Uint32,
        repeated: false,
    }],
};

static REQ_LOGIN_BEAT: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqLoginBeat",
    fields: &[FieldDescriptor {
        number: 1,
        name: "contract",
        kind: FieldKind::String,
        repeated: false,
    }],
};

static REQ_OAUTH2_AUTH: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqOauth2Auth",
    fields: &[
        FieldDescriptor { number: 1, name: "type", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor { number: 2, name: "code", kind: FieldKind::String, repeated: false },
        FieldDescriptor { number: 3, name: "uid", kind: FieldKind::Uint32, repeated: false },
    ],
};

static RES_OAUTH2_AUTH: MessageDescriptor = MessageDescriptor {
    name: ".lq.ResOauth2Auth",
    fields: &[
        FieldDescriptor {
            number: 1,
            name: "error",
            kind: FieldKind::Message(&ERROR),
            repeated: false,
        },
        FieldDescriptor {
            number: 2,
            name: "access_token",
            kind: FieldKind::String,
            repeated: false,
        },
    ],
};

static REQ_OAUTH2_CHECK: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqOauth2Check",
    fields: &[
        FieldDescriptor { number: 1, name: "type", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor {
            number: 2,
            name: "access_token",
            kind: FieldKind::String,
            repeated: false,
        },
    ],
};

static RES_OAUTH2_CHECK: MessageDescriptor = MessageDescriptor {
    name: ".lq.ResOauth2Check",
    fields: &[
        FieldDescriptor {
            number: 1,
            name: "error",
            kind: FieldKind::Message(&ERROR),
            repeated: false,
        },
        FieldDescriptor { number: 2, name: "has_account", kind: FieldKind::Bool, repeated: false },
    ],
};

static REQ_OAUTH2_LOGIN: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqOauth2Login",
    fields: &[
        FieldDescriptor { number: 1, name: "type", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor {
            number: 2,
            name: "access_token",
            kind: FieldKind::String,
            repeated: false,
        },
        FieldDescriptor { number: 3, name: "reconnect", kind: FieldKind::Bool, repeated: false },
    ],
};

static RES_LOGIN: MessageDescriptor = MessageDescriptor {
    name: ".lq.ResLogin",
    fields: &[
        FieldDescriptor {
            number: 1,
            name: "error",
            kind: FieldKind::Message(&ERROR),
            repeated: false,
        },
        FieldDescriptor { number: 2, name: "account_id", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor {
            number: 3,
            name: "access_token",
            kind: FieldKind::String,
            repeated: false,
        },
        FieldDescriptor { number: 4, name: "signup", kind: FieldKind::Bool, repeated: false },
    ],
};

static RES_SERVER_TIME: MessageDescriptor = MessageDescriptor {
    name: ".lq.ResServerTime",
    fields: &[FieldDescriptor {
        number: 1,
        name: "server_time",
        kind: FieldKind::Uint32,
        repeated: false,
    }],
};

static REQ_UPDATE_CLIENT_VALUE: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqUpdateClientValue",
    fields: &[
        FieldDescriptor { number: 1, name: "key", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor { number: 2, name: "value", kind: FieldKind::Uint32, repeated: false },
    ],
};

static REQ_READ_ANNOUNCEMENT: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqReadAnnouncement",
    fields: &[FieldDescriptor {
        number: 1,
        name: "announcement_id",
        kind: FieldKind::Uint32,
        repeated: true,
    }],
};

static REQ_DO_ACTIVITY_SIGN_IN: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqDoActivitySignIn",
    fields: &[FieldDescriptor {
        number: 1,
        name: "activity_id",
        kind: FieldKind::Uint32,
        repeated: false,
    }],
};

static ROOM: MessageDescriptor = MessageDescriptor {
    name: ".lq.Room",
    fields: &[
        FieldDescriptor { number: 1, name: "room_id", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor { number: 2, name: "owner_id", kind: FieldKind::Uint32, repeated: false },
        FieldDescriptor {
            number: 3,
            name: "max_player_count",
            kind: FieldKind::Uint32,
            repeated: false,
        },
    ],
};

static REQ_CREATE_ROOM: MessageDescriptor = MessageDescriptor {
    name: ".lq.ReqCreateRoom",
    fields: &[
        FieldDescriptor {
            number: 1,
            name: "player_count",
            kind: FieldKind::Uint32,
            repeated: false,
        },
        FieldDescriptor { number: 2, name: "public_live", kind: FieldKind::Bool, repeated: false },
    ],
};

static RES_CREATE_ROOM: MessageDescriptor = MessageDescriptor {
    name: ".lq.ResCreateRoom",
    fields: &[
        FieldDescriptor {
            number: 1,
            name: "error",
            kind: FieldKind::Message(&ERROR),
            repeated: false,
        },
        FieldDescriptor { number: 2, name: "room", kind: FieldKind::Message(&ROOM), repeated: false },
    ],
};

static NOTIFY_ACCOUNT_UPDATE: MessageDescriptor = MessageDescriptor {
    name: ".lq.NotifyAccountUpdate",
    fields: &[],
};

static NOTIFY_SHOP_UPDATE: MessageDescriptor = MessageDescriptor {
    name: ".lq.NotifyShopUpdate",
    fields: &[],
};

static NOTIFY_NEW_MAIL: MessageDescriptor = MessageDescriptor {
    name: ".lq.NotifyNewMail",
    fields: &[FieldDescriptor {
        number: 1,
        name: "mail_id",
        kind: FieldKind::Uint32,
        repeated: false,
    }],
};

static NOTIFY_ANNOUNCEMENT_UPDATE: MessageDescriptor = MessageDescriptor {
    name: ".lq.NotifyAnnouncementUpdate",
    fields: &[],
};

/// Lobby service methods: `(name, request, response)`.
pub(crate) static LOBBY_METHODS: &[(&str, &MessageDescriptor, &MessageDescriptor)] = &[
    (".lq.Lobby.heatbeat", &REQ_HEATBEAT, &RES_COMMON),
    (".lq.Lobby.loginBeat", &REQ_LOGIN_BEAT, &RES_COMMON),
    (".lq.Lobby.loginSuccess", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.oauth2Auth", &REQ_OAUTH2_AUTH, &RES_OAUTH2_AUTH),
    (".lq.Lobby.oauth2Check", &REQ_OAUTH2_CHECK, &RES_OAUTH2_CHECK),
    (".lq.Lobby.oauth2Login", &REQ_OAUTH2_LOGIN, &RES_LOGIN),
    (".lq.Lobby.fetchLastPrivacy", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchServerTime", &REQ_COMMON, &RES_SERVER_TIME),
    (".lq.Lobby.fetchServerSettings", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchConnectionInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchClientValue", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchFriendList", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchFriendApplyList", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchRecentFriend", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchMailInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchDailyTask", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchReviveCoinInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchTitleList", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchBagInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchShopInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchShopInterval", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchActivityList", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchAccountActivityData", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchActivityInterval", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchActivityBuff", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchVipReward", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchMonthTicketInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchAchievement", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchSelfGamePointRank", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchCommentSetting", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchAccountSettings", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchModNicknameTime", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchMisc", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchAnnouncement", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchRollingNotice", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchCharacterInfo", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchAllCommonViews", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.fetchCollectedGameRecordList", &REQ_COMMON, &RES_COMMON),
    (".lq.Lobby.updateClientValue", &REQ_UPDATE_CLIENT_VALUE, &RES_COMMON),
    (".lq.Lobby.readAnnouncement", &REQ_READ_ANNOUNCEMENT, &RES_COMMON),
    (".lq.Lobby.doActivitySignIn", &REQ_DO_ACTIVITY_SIGN_IN, &RES_COMMON),
    (".lq.Lobby.createRoom", &REQ_CREATE_ROOM, &RES_CREATE_ROOM),
];

/// Server-push notification types: `(name, shape)`. These have no response
/// leg; the registry records them with no response descriptor.
pub(crate) static NOTIFY_TYPES: &[(&str, &MessageDescriptor)] = &[
    (".lq.NotifyAccountUpdate", &NOTIFY_ACCOUNT_UPDATE),
    (".lq.NotifyShopUpdate", &NOTIFY_SHOP_UPDATE),
    (".lq.NotifyNewMail", &NOTIFY_NEW_MAIL),
    (".lq.NotifyAnnouncementUpdate", &NOTIFY_ANNOUNCEMENT_UPDATE),
];
